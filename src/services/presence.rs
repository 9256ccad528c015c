use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::NaiveDate;
use sha2::{Digest, Sha256};

use crate::database::models::{Company, EntryType, WorkMode};
use crate::error::AppError;

const OUTSIDE_RADIUS: &str = "You are outside the office radius.";
const INVALID_QR: &str = "Invalid or expired QR code.";

/// Location and QR material supplied by the caller when starting an entry.
#[derive(Debug, Default)]
pub struct PresenceClaim<'a> {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub qr_code: Option<&'a str>,
}

impl PresenceClaim<'_> {
    fn has_office_proof(&self) -> bool {
        self.latitude.is_some() || self.longitude.is_some() || self.qr_code.is_some()
    }
}

/// Great-circle distance between two coordinates, in meters (haversine).
pub fn distance_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    const EARTH_RADIUS_M: f64 = 6_371_000.0;

    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let delta_phi = (lat2 - lat1).to_radians();
    let delta_lambda = (lon2 - lon1).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_M * a.sqrt().atan2((1.0 - a).sqrt())
}

/// The QR code for a given day: a pure function of the company secret and
/// the date, so codes rotate at midnight and yesterday's code is rejected.
pub fn daily_code(qr_secret: &str, date: NaiveDate) -> String {
    let mut hasher = Sha256::new();
    hasher.update(qr_secret.as_bytes());
    hasher.update(b":");
    hasher.update(date.format("%Y-%m-%d").to_string().as_bytes());

    URL_SAFE_NO_PAD.encode(hasher.finalize())
}

/// Validate the attendance proof for a start() call and decide the entry
/// type that records which proof path succeeded.
pub fn verify_presence(
    work_mode: WorkMode,
    company: Option<&Company>,
    claim: &PresenceClaim,
    today: NaiveDate,
) -> Result<EntryType, AppError> {
    match work_mode {
        WorkMode::Remote => Ok(EntryType::Remote),
        WorkMode::Office => verify_office_presence(company, claim, today),
        WorkMode::Hybrid => {
            if claim.has_office_proof() {
                verify_office_presence(company, claim, today)
            } else {
                Ok(EntryType::Remote)
            }
        }
    }
}

fn verify_office_presence(
    company: Option<&Company>,
    claim: &PresenceClaim,
    today: NaiveDate,
) -> Result<EntryType, AppError> {
    let company = company.ok_or_else(|| {
        AppError::Validation("User is not assigned to a company with an office.".to_string())
    })?;

    let mut via_gps = false;
    let mut via_qr = false;

    if let (Some(office_lat), Some(office_lon), Some(radius)) =
        (company.latitude, company.longitude, company.radius_meters)
    {
        let (lat, lon) = match (claim.latitude, claim.longitude) {
            (Some(lat), Some(lon)) => (lat, lon),
            _ => return Err(AppError::Validation(OUTSIDE_RADIUS.to_string())),
        };

        if distance_meters(lat, lon, office_lat, office_lon) > radius {
            return Err(AppError::Validation(OUTSIDE_RADIUS.to_string()));
        }

        via_gps = true;
    }

    if let Some(secret) = &company.qr_secret {
        let code = claim
            .qr_code
            .ok_or_else(|| AppError::Validation(INVALID_QR.to_string()))?;

        if code != daily_code(secret, today) {
            return Err(AppError::Validation(INVALID_QR.to_string()));
        }

        via_qr = true;
    }

    match (via_gps, via_qr) {
        (true, true) => Ok(EntryType::GpsQr),
        (true, false) => Ok(EntryType::Gps),
        (false, true) => Ok(EntryType::Qr),
        (false, false) => Err(AppError::Validation(
            "Company has no office attendance configuration.".to_string(),
        )),
    }
}
