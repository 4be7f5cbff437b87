use thiserror::Error;
use validator::ValidateEmail;

use super::reservation::{GuestInfo, NewReservation};

#[derive(Debug, Clone)]
pub struct GuestEmail(String);

impl GuestEmail{
    pub fn parse(email: String) -> Result<GuestEmail, GuestContactError>{
        if email.validate_email(){
            Ok(Self(email))
        } else {
            Err(GuestContactError::InvalidEmail(email))
        }
    }

    pub fn inner(&self) -> String {
        self.0.clone()
    }
}

// Guest phone numbers are stored in international (+country) format
#[derive(Debug, Clone)]
pub struct GuestPhone(String);

impl GuestPhone{
    pub fn parse(number: String) -> Result<GuestPhone, GuestContactError>{
        if phonenumber::parse(None, number.clone()).is_ok(){
            Ok(Self(number))
        } else {
            Err(GuestContactError::InvalidPhone(number))
        }
    }

    pub fn inner(&self) -> String {
        self.0.clone()
    }
}

impl std::fmt::Display for GuestPhone {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        std::fmt::Display::fmt(&self.0, f)
    }
}

#[derive(Error, Debug, PartialEq)]
pub enum GuestContactError{
    #[error("guest name must not be empty")]
    MissingName,
    #[error("{0} is not a valid guest email")]
    InvalidEmail(String),
    #[error("{0} is not a valid guest phone number")]
    InvalidPhone(String),
    #[error("party size must be at least 1")]
    EmptyParty
}

// Checks a reservation before it is sent to the backend
pub fn validate_new_reservation(reservation: &NewReservation) -> Result<(), GuestContactError>{
    if reservation.no_of_diners == 0 {
        return Err(GuestContactError::EmptyParty)
    }
    validate_guest_info(&reservation.guest_info)
}

pub fn validate_guest_info(guest: &GuestInfo) -> Result<(), GuestContactError>{
    if guest.name.trim().is_empty() {
        return Err(GuestContactError::MissingName)
    }
    if let Some(email) = &guest.email {
        GuestEmail::parse(email.clone())?;
    }
    if let Some(phone) = &guest.phone {
        GuestPhone::parse(phone.clone())?;
    }
    Ok(())
}
