use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ServiceError;
use crate::validation::{
    MAX_ADDRESS_LEN, MAX_NAME_LEN, MAX_POSTAL_CODE_LEN, format_date, normalize_email, parse_date,
    require_id, require_text,
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    #[default]
    #[serde(alias = "buerger")]
    Citizen,
    #[serde(alias = "admin")]
    Administrator,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Citizen => "citizen",
            Self::Administrator => "administrator",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "citizen" | "buerger" => Some(Self::Citizen),
            "administrator" | "admin" => Some(Self::Administrator),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Verification {
    #[default]
    Pending,
    Verified,
}

impl Verification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Verified => "verified",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pending" => Some(Self::Pending),
            "verified" => Some(Self::Verified),
            _ => None,
        }
    }
}

/// A registered voter ("Bürger").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citizen {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub birthdate: NaiveDate,
    pub address: String,
    pub postal_code: String,
    /// Lowercased; unique across citizens.
    pub email: String,
    pub password_hash: String,
    pub role: Role,
    pub verification: Verification,
}

impl Citizen {
    /// Full years lived on `today`.
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        today.years_since(self.birthdate).unwrap_or(0)
    }
}

/// Validated registration data. The password is still plaintext here and
/// only leaves this type hashed.
#[derive(Debug, Clone)]
pub struct NewCitizen {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub birthdate: NaiveDate,
    pub address: String,
    pub postal_code: String,
    pub email: String,
    pub password: String,
    pub role: Role,
    pub verification: Verification,
}

impl NewCitizen {
    pub fn into_citizen(self, password_hash: String) -> Citizen {
        Citizen {
            id: self.id,
            first_name: self.first_name,
            last_name: self.last_name,
            birthdate: self.birthdate,
            address: self.address,
            postal_code: self.postal_code,
            email: self.email,
            password_hash,
            role: self.role,
            verification: self.verification,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistrationRequest {
    pub id: Option<String>,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
    pub birthdate: Option<String>,
    pub address: Option<String>,
    pub postal_code: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
    pub verification: Option<String>,
}

impl RegistrationRequest {
    /// Validates the request as submitted on `today`.
    pub fn into_new_citizen(self, today: NaiveDate) -> Result<NewCitizen, ServiceError> {
        let birthdate = parse_date(
            &require_text(self.birthdate.as_deref(), "birthdate", 10)?,
            "birthdate",
        )?;
        if birthdate > today {
            return Err(ServiceError::validation("birthdate lies in the future"));
        }
        let email = normalize_email(self.email.as_deref().unwrap_or_default())?;
        let password = self
            .password
            .filter(|password| !password.is_empty())
            .ok_or_else(|| ServiceError::validation("password is required"))?;
        let role = match self.role.as_deref() {
            Some(raw) => Role::parse(raw)
                .ok_or_else(|| ServiceError::validation(format!("unknown role {raw}")))?,
            None => Role::default(),
        };
        let verification = match self.verification.as_deref() {
            Some(raw) => Verification::parse(raw).ok_or_else(|| {
                ServiceError::validation(format!("unknown verification status {raw}"))
            })?,
            None => Verification::default(),
        };

        Ok(NewCitizen {
            id: require_id(self.id.as_deref(), "id")?,
            first_name: require_text(self.first_name.as_deref(), "first_name", MAX_NAME_LEN)?,
            last_name: require_text(self.last_name.as_deref(), "last_name", MAX_NAME_LEN)?,
            birthdate,
            address: require_text(self.address.as_deref(), "address", MAX_ADDRESS_LEN)?,
            postal_code: require_text(
                self.postal_code.as_deref(),
                "postal_code",
                MAX_POSTAL_CODE_LEN,
            )?,
            email,
            password,
            role,
            verification,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

/// Citizen profile as returned to clients. Never carries the password hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CitizenView {
    pub id: String,
    pub first_name: String,
    pub last_name: String,
    pub birthdate: String,
    pub address: String,
    pub postal_code: String,
    pub email: String,
    pub role: Role,
    pub verification: Verification,
}

impl From<&Citizen> for CitizenView {
    fn from(citizen: &Citizen) -> Self {
        Self {
            id: citizen.id.clone(),
            first_name: citizen.first_name.clone(),
            last_name: citizen.last_name.clone(),
            birthdate: format_date(citizen.birthdate),
            address: citizen.address.clone(),
            postal_code: citizen.postal_code.clone(),
            email: citizen.email.clone(),
            role: citizen.role,
            verification: citizen.verification,
        }
    }
}
