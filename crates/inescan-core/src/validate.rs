//! Field-level validators for the affiliation form.
//!
//! Each validator is total: it returns `Ok(())` or a [`ValidationError`]
//! whose `Display` is the message shown next to the field.

use once_cell::sync::Lazy;
use regex::Regex;
use thiserror::Error;

static NAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-ZÀ-ÿñÑ\s]{2,50}$").unwrap());

static CURP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{4}[0-9]{6}[HM][A-Z]{5}[0-9A-Z][0-9]$").unwrap());

static CLAVE_ELECTOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z]{6}[0-9]{8}[HM][0-9]{3}$").unwrap());

static EMAIL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").unwrap());

static PHONE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[0-9]{10}$").unwrap());

static PLACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-ZÀ-ÿñÑ\s,.\-]{5,100}$").unwrap());

/// Length of both the CURP and the electoral-roll key.
pub const ID_LENGTH: usize = 18;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Este campo es obligatorio")]
    Required,
    #[error("Solo se permiten letras y espacios (2-50 caracteres)")]
    InvalidName,

    #[error("La CURP es obligatoria")]
    CurpRequired,
    #[error("La CURP debe tener exactamente 18 caracteres")]
    CurpLength,
    #[error("Formato de CURP inválido")]
    CurpFormat,

    #[error("La clave de elector es obligatoria")]
    ClaveElectorRequired,
    #[error("La clave de elector debe tener exactamente 18 caracteres")]
    ClaveElectorLength,
    #[error("Formato de clave de elector inválido")]
    ClaveElectorFormat,

    #[error("El correo electrónico es obligatorio")]
    EmailRequired,
    #[error("Formato de correo electrónico inválido")]
    EmailFormat,

    #[error("El número de teléfono es obligatorio")]
    PhoneRequired,
    #[error("El teléfono debe tener exactamente 10 dígitos")]
    PhoneFormat,

    #[error("El lugar de nacimiento es obligatorio")]
    PlaceRequired,
    #[error("Formato de lugar inválido (5-100 caracteres)")]
    PlaceFormat,

    #[error("Debes seleccionar un género")]
    GenderRequired,
}

/// Person name: 2-50 letters or spaces, accented letters allowed.
pub fn validate_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required);
    }
    if !NAME_RE.is_match(value) {
        return Err(ValidationError::InvalidName);
    }
    Ok(())
}

/// CURP: 18 characters, `AAAA999999[HM]AAAAA[0-9A-Z]9`, tested upper-cased.
pub fn validate_curp(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::CurpRequired);
    }
    if value.chars().count() != ID_LENGTH {
        return Err(ValidationError::CurpLength);
    }
    if !CURP_RE.is_match(&value.to_uppercase()) {
        return Err(ValidationError::CurpFormat);
    }
    Ok(())
}

/// Electoral-roll key: 18 characters, `AAAAAA99999999[HM]999`, tested upper-cased.
pub fn validate_clave_elector(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::ClaveElectorRequired);
    }
    if value.chars().count() != ID_LENGTH {
        return Err(ValidationError::ClaveElectorLength);
    }
    if !CLAVE_ELECTOR_RE.is_match(&value.to_uppercase()) {
        return Err(ValidationError::ClaveElectorFormat);
    }
    Ok(())
}

pub fn validate_email(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmailRequired);
    }
    if !EMAIL_RE.is_match(value) {
        return Err(ValidationError::EmailFormat);
    }
    Ok(())
}

/// Exactly ten digits, no formatting.
pub fn validate_phone(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::PhoneRequired);
    }
    if !PHONE_RE.is_match(value) {
        return Err(ValidationError::PhoneFormat);
    }
    Ok(())
}

/// Free-text place: 5-100 letters, spaces, commas, periods or hyphens.
pub fn validate_place(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::PlaceRequired);
    }
    if !PLACE_RE.is_match(value) {
        return Err(ValidationError::PlaceFormat);
    }
    Ok(())
}

pub fn validate_required(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::Required);
    }
    Ok(())
}

/// The validators by name, for callers that pick one at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Name,
    Curp,
    ClaveElector,
    Email,
    Phone,
    Place,
    Required,
}

impl FieldKind {
    pub fn validate(self, value: &str) -> Result<(), ValidationError> {
        match self {
            Self::Name => validate_name(value),
            Self::Curp => validate_curp(value),
            Self::ClaveElector => validate_clave_elector(value),
            Self::Email => validate_email(value),
            Self::Phone => validate_phone(value),
            Self::Place => validate_place(value),
            Self::Required => validate_required(value),
        }
    }
}

// ── Formatting ──

/// Upper-case an ID and drop everything but `A-Z` and `0-9`.
pub fn clean_id(value: &str) -> String {
    value
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
        .collect()
}

pub fn digits_only(value: &str) -> String {
    value.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// `(XXX) XXX-XXXX` for ten-digit numbers; anything else is returned as is.
pub fn format_phone(value: &str) -> String {
    let digits = digits_only(value);
    if digits.len() == 10 {
        format!("({}) {}-{}", &digits[..3], &digits[3..6], &digits[6..])
    } else {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CURP: &str = "GOMC850615MZSRRR09";
    const CLAVE: &str = "GMCRRR85061532M400";

    #[test]
    fn name_accepts_accents_and_spaces() {
        assert_eq!(validate_name("José Ángel"), Ok(()));
        assert_eq!(validate_name("MUÑOZ"), Ok(()));
        assert_eq!(validate_name("Li"), Ok(()));
    }

    #[test]
    fn name_rejections() {
        assert_eq!(validate_name("  "), Err(ValidationError::Required));
        assert_eq!(validate_name("J"), Err(ValidationError::InvalidName));
        assert_eq!(validate_name("Juan2"), Err(ValidationError::InvalidName));
        assert_eq!(
            validate_name(&"a".repeat(51)),
            Err(ValidationError::InvalidName)
        );
    }

    #[test]
    fn curp_any_case_passes() {
        assert_eq!(validate_curp(CURP), Ok(()));
        assert_eq!(validate_curp(&CURP.to_lowercase()), Ok(()));
        assert_eq!(validate_curp("GomC850615mZSrrr09"), Ok(()));
    }

    #[test]
    fn curp_length_is_checked_before_format() {
        assert_eq!(validate_curp(&CURP[..17]), Err(ValidationError::CurpLength));
        assert_eq!(
            validate_curp(&format!("{CURP}0")),
            Err(ValidationError::CurpLength)
        );
        assert_eq!(
            ValidationError::CurpLength.to_string(),
            "La CURP debe tener exactamente 18 caracteres"
        );
    }

    #[test]
    fn curp_format_and_required() {
        assert_eq!(validate_curp(""), Err(ValidationError::CurpRequired));
        // 'X' where the gender letter belongs.
        assert_eq!(
            validate_curp("GOMC850615XZSRRR09"),
            Err(ValidationError::CurpFormat)
        );
        // Letter where the final check digit belongs.
        assert_eq!(
            validate_curp("GOMC850615MZSRRR0A"),
            Err(ValidationError::CurpFormat)
        );
    }

    #[test]
    fn clave_elector_rules() {
        assert_eq!(validate_clave_elector(CLAVE), Ok(()));
        assert_eq!(validate_clave_elector(&CLAVE.to_lowercase()), Ok(()));
        assert_eq!(
            validate_clave_elector(" "),
            Err(ValidationError::ClaveElectorRequired)
        );
        assert_eq!(
            validate_clave_elector(&CLAVE[..17]),
            Err(ValidationError::ClaveElectorLength)
        );
        assert_eq!(
            validate_clave_elector("GMCRRR8506153XM400"),
            Err(ValidationError::ClaveElectorFormat)
        );
    }

    #[test]
    fn email_rules() {
        assert_eq!(validate_email("ana@example.mx"), Ok(()));
        assert_eq!(validate_email(""), Err(ValidationError::EmailRequired));
        assert_eq!(validate_email("ana@example"), Err(ValidationError::EmailFormat));
        assert_eq!(validate_email("ana @ex.mx"), Err(ValidationError::EmailFormat));
    }

    #[test]
    fn phone_rules() {
        assert_eq!(validate_phone("4921234567"), Ok(()));
        assert_eq!(validate_phone(""), Err(ValidationError::PhoneRequired));
        assert_eq!(validate_phone("492123456"), Err(ValidationError::PhoneFormat));
        assert_eq!(
            validate_phone("(492) 123-4567"),
            Err(ValidationError::PhoneFormat)
        );
    }

    #[test]
    fn place_rules() {
        assert_eq!(validate_place("Fresnillo, Zac."), Ok(()));
        assert_eq!(validate_place("Villa-Hidalgo"), Ok(()));
        assert_eq!(validate_place(""), Err(ValidationError::PlaceRequired));
        assert_eq!(validate_place("Zac"), Err(ValidationError::PlaceFormat));
        assert_eq!(validate_place("Calle 5"), Err(ValidationError::PlaceFormat));
    }

    #[test]
    fn required_rule() {
        assert_eq!(validate_required("x"), Ok(()));
        assert_eq!(validate_required(" \t"), Err(ValidationError::Required));
    }

    #[test]
    fn field_kind_dispatch() {
        assert_eq!(FieldKind::Curp.validate(CURP), Ok(()));
        assert_eq!(
            FieldKind::Phone.validate("12"),
            Err(ValidationError::PhoneFormat)
        );
    }

    #[test]
    fn clean_and_format() {
        assert_eq!(clean_id(" gomc-850615 mzs "), "GOMC850615MZS");
        assert_eq!(digits_only("(492) 123-4567"), "4921234567");
        assert_eq!(format_phone("4921234567"), "(492) 123-4567");
        assert_eq!(format_phone("12345"), "12345");
    }
}
