//! Profile edit form. Only changed fields are sent.

use super::FormCore;
use crate::app::session::{SessionStore, UserUpdate};
use crate::core::error::{PortalError, Result};
use crate::utils::validation::{validate_length, validate_phone, validate_required, validate_zip, FieldErrors};
use chrono::NaiveDate;
use shared::{UpdateProfileRequest, User};

/// Minimum age to hold an account
pub const MINIMUM_AGE: u32 = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    FirstName,
    LastName,
    Phone,
    Address,
    City,
    State,
    ZipCode,
    Country,
    DateOfBirth,
}

impl ProfileField {
    pub fn key(&self) -> &'static str {
        match self {
            ProfileField::FirstName => "firstName",
            ProfileField::LastName => "lastName",
            ProfileField::Phone => "phone",
            ProfileField::Address => "address",
            ProfileField::City => "city",
            ProfileField::State => "state",
            ProfileField::ZipCode => "zipCode",
            ProfileField::Country => "country",
            ProfileField::DateOfBirth => "dateOfBirth",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ProfileForm {
    original: User,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub country: String,
    /// `YYYY-MM-DD`, empty when not given
    pub date_of_birth: String,
    core: FormCore,
}

fn text(value: &Option<String>) -> String {
    value.clone().unwrap_or_default()
}

/// `Some(new)` when the trimmed value differs from the stored one.
fn changed(new: &str, old: &Option<String>) -> Option<String> {
    let new = new.trim();
    (new != old.as_deref().unwrap_or("")).then(|| new.to_string())
}

impl ProfileForm {
    pub fn from_user(user: &User) -> Self {
        Self {
            original: user.clone(),
            first_name: user.first_name.clone(),
            last_name: user.last_name.clone(),
            phone: text(&user.phone),
            address: text(&user.address),
            city: text(&user.city),
            state: text(&user.state),
            zip_code: text(&user.zip_code),
            country: text(&user.country),
            date_of_birth: user
                .date_of_birth
                .map(|d| d.format("%Y-%m-%d").to_string())
                .unwrap_or_default(),
            core: FormCore::default(),
        }
    }

    pub fn core(&self) -> &FormCore {
        &self.core
    }

    pub fn error(&self, field: ProfileField) -> Option<&str> {
        self.core.errors.get(field.key())
    }

    pub fn set(&mut self, field: ProfileField, value: impl Into<String>) {
        let value = value.into();
        let slot = match field {
            ProfileField::FirstName => &mut self.first_name,
            ProfileField::LastName => &mut self.last_name,
            ProfileField::Phone => &mut self.phone,
            ProfileField::Address => &mut self.address,
            ProfileField::City => &mut self.city,
            ProfileField::State => &mut self.state,
            ProfileField::ZipCode => &mut self.zip_code,
            ProfileField::Country => &mut self.country,
            ProfileField::DateOfBirth => &mut self.date_of_birth,
        };
        *slot = value;
        self.core.touch(field.key());
    }

    /// Validate against `today` and build the patch of changed fields.
    pub fn validate_at(&self, today: NaiveDate) -> std::result::Result<UpdateProfileRequest, FieldErrors> {
        let mut errors = FieldErrors::new();

        errors.check(ProfileField::FirstName.key(), validate_required(&self.first_name, "First name"));
        errors.check(ProfileField::FirstName.key(), validate_length(&self.first_name, "First name", 1, 50));
        errors.check(ProfileField::LastName.key(), validate_required(&self.last_name, "Last name"));
        errors.check(ProfileField::LastName.key(), validate_length(&self.last_name, "Last name", 1, 50));
        errors.check(ProfileField::Phone.key(), validate_phone(&self.phone));
        errors.check(ProfileField::ZipCode.key(), validate_zip(&self.zip_code));

        let date_of_birth = match self.date_of_birth.trim() {
            "" => None,
            raw => match NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
                Ok(date) if date >= today => {
                    errors.insert(ProfileField::DateOfBirth.key(), "Date of birth must be in the past");
                    None
                }
                Ok(date) if today.years_since(date).unwrap_or(0) < MINIMUM_AGE => {
                    errors.insert(
                        ProfileField::DateOfBirth.key(),
                        format!("You must be at least {} years old", MINIMUM_AGE),
                    );
                    None
                }
                Ok(date) => Some(date),
                Err(_) => {
                    errors.insert(ProfileField::DateOfBirth.key(), "Invalid date of birth");
                    None
                }
            },
        };

        errors.into_result()?;

        let original = &self.original;
        Ok(UpdateProfileRequest {
            first_name: changed(&self.first_name, &Some(original.first_name.clone())),
            last_name: changed(&self.last_name, &Some(original.last_name.clone())),
            phone: changed(&self.phone, &original.phone),
            address: changed(&self.address, &original.address),
            city: changed(&self.city, &original.city),
            state: changed(&self.state, &original.state),
            zip_code: changed(&self.zip_code, &original.zip_code),
            country: changed(&self.country, &original.country),
            date_of_birth: date_of_birth.filter(|d| Some(*d) != original.date_of_birth),
        })
    }

    pub fn validate(&self) -> std::result::Result<UpdateProfileRequest, FieldErrors> {
        self.validate_at(chrono::Local::now().date_naive())
    }

    /// Send the changed fields through the session so the stored user is replaced.
    pub async fn submit<F>(&mut self, session: &SessionStore, on_success: F) -> Result<User>
    where
        F: FnOnce(&User),
    {
        let patch = self.validate().map_err(|errors| self.core.reject(errors))?;
        if patch == UpdateProfileRequest::default() {
            return Err(PortalError::State("No changes to save".to_string()));
        }
        self.core.begin()?;

        let result = session.update_user(UserUpdate::Patch(patch)).await;
        let user = self.core.finish(result, "Failed to update profile")?;
        *self = Self {
            core: self.core.clone(),
            ..Self::from_user(&user)
        };
        on_success(&user);
        Ok(user)
    }
}
