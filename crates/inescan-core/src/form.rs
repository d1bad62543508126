//! The affiliation form: pre-filling from a reconciled record and whole-form
//! validation before moving on to the next step.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::record::{CanonicalRecord, Gender};
use crate::validate::{
    ValidationError, digits_only, validate_clave_elector, validate_curp, validate_email,
    validate_name, validate_phone, validate_place, validate_required,
};

/// State every affiliation is registered under.
pub const DEFAULT_STATE: &str = "Zacatecas";

/// Form fields written by [`AffiliationForm::prefill`].
pub const PREFILLED_FIELDS: &[&str] = &[
    "nombres",
    "primer_apellido",
    "segundo_apellido",
    "lugar_nacimiento",
    "curp",
    "clave_elector",
    "genero",
    "municipio",
    "calle",
    "numero_exterior",
    "numero_interior",
    "colonia",
    "codigo_postal",
];

/// Every input of the affiliation form. Blank strings mean "not filled in".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AffiliationForm {
    pub afiliador: String,
    pub nombres: String,
    pub primer_apellido: String,
    pub segundo_apellido: String,
    pub lugar_nacimiento: String,
    pub curp: String,
    pub clave_elector: String,
    pub email: String,
    pub telefono: String,
    pub genero: Option<Gender>,
    pub llegada_prd: String,
    pub estado: String,
    pub municipio: String,
    pub colonia: String,
    pub codigo_postal: String,
    pub calle: String,
    pub numero_exterior: String,
    pub numero_interior: String,
}

/// Outcome of pre-filling the form from a record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefillReport {
    /// Names of the fields that were written.
    pub filled: Vec<&'static str>,
    /// Number of fields the prefill maps.
    pub total: usize,
    /// Human-readable labels of required fields still blank.
    pub pending: Vec<&'static str>,
}

/// A failed field and the message to show next to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub error: ValidationError,
}

impl AffiliationForm {
    /// Write every present value of `record` into the form.
    ///
    /// Absent fields never overwrite what is already there. IDs are
    /// upper-cased, the postal code keeps digits only, and `estado` is always
    /// set to [`DEFAULT_STATE`].
    pub fn prefill(&mut self, record: &CanonicalRecord) -> PrefillReport {
        let mut filled = Vec::new();

        let mut put = |name: &'static str, slot: &mut String, value: Option<String>| {
            if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
                debug!(field = name, value = %v, "prefilled");
                *slot = v;
                filled.push(name);
            }
        };

        put(
            "nombres",
            &mut self.nombres,
            record.nombres_display().map(str::to_string),
        );
        put(
            "primer_apellido",
            &mut self.primer_apellido,
            record.primer_apellido.clone(),
        );
        put(
            "segundo_apellido",
            &mut self.segundo_apellido,
            record.segundo_apellido.clone(),
        );
        put(
            "lugar_nacimiento",
            &mut self.lugar_nacimiento,
            record.lugar_nacimiento.clone(),
        );
        put(
            "curp",
            &mut self.curp,
            record.curp.as_deref().map(str::to_uppercase),
        );
        put(
            "clave_elector",
            &mut self.clave_elector,
            record.clave_elector.as_deref().map(str::to_uppercase),
        );
        put(
            "municipio",
            &mut self.municipio,
            record.municipio_display().map(str::to_string),
        );
        put("calle", &mut self.calle, record.calle.clone());
        put(
            "numero_exterior",
            &mut self.numero_exterior,
            record.numero_exterior.clone(),
        );
        put(
            "numero_interior",
            &mut self.numero_interior,
            record.numero_interior.clone(),
        );
        put("colonia", &mut self.colonia, record.colonia.clone());
        put(
            "codigo_postal",
            &mut self.codigo_postal,
            record.codigo_postal.as_deref().map(digits_only),
        );

        if let Some(g) = record.sexo {
            self.genero = Some(g);
            filled.push("genero");
        }

        self.estado = DEFAULT_STATE.to_string();

        let report = PrefillReport {
            filled,
            total: PREFILLED_FIELDS.len(),
            pending: self.pending(),
        };
        info!(
            filled = report.filled.len(),
            total = report.total,
            pending = report.pending.len(),
            "form prefilled from extraction"
        );
        report
    }

    /// Labels of required fields that are still blank.
    pub fn pending(&self) -> Vec<&'static str> {
        let required: [(&'static str, bool); 14] = [
            ("Responsable de afiliación", self.afiliador.trim().is_empty()),
            ("Nombre(s)", self.nombres.trim().is_empty()),
            ("Primer apellido", self.primer_apellido.trim().is_empty()),
            ("Lugar de nacimiento", self.lugar_nacimiento.trim().is_empty()),
            ("CURP", self.curp.trim().is_empty()),
            ("Clave de elector", self.clave_elector.trim().is_empty()),
            ("Correo electrónico", self.email.trim().is_empty()),
            ("Teléfono", self.telefono.trim().is_empty()),
            ("Género", self.genero.is_none()),
            ("¿Cómo llegas al PRD?", self.llegada_prd.trim().is_empty()),
            ("Municipio", self.municipio.trim().is_empty()),
            ("Colonia", self.colonia.trim().is_empty()),
            ("Código postal", self.codigo_postal.trim().is_empty()),
            ("Calle", self.calle.trim().is_empty()),
        ];
        required
            .into_iter()
            .filter(|(_, blank)| *blank)
            .map(|(label, _)| label)
            .collect()
    }

    /// Validate the whole form. An empty result means it may be submitted.
    ///
    /// The second surname is optional and only checked when filled in.
    /// Address fields only need to be non-blank.
    pub fn validate(&self) -> Vec<FieldError> {
        type Check = fn(&str) -> Result<(), ValidationError>;
        let personal: [(&'static str, &str, Check); 9] = [
            ("afiliador", self.afiliador.as_str(), validate_required),
            ("nombres", self.nombres.as_str(), validate_name),
            ("primer_apellido", self.primer_apellido.as_str(), validate_name),
            ("lugar_nacimiento", self.lugar_nacimiento.as_str(), validate_place),
            ("curp", self.curp.as_str(), validate_curp),
            ("clave_elector", self.clave_elector.as_str(), validate_clave_elector),
            ("email", self.email.as_str(), validate_email),
            ("telefono", self.telefono.as_str(), validate_phone),
            ("llegada_prd", self.llegada_prd.as_str(), validate_required),
        ];

        let mut errors: Vec<FieldError> = personal
            .into_iter()
            .filter_map(|(field, value, check)| {
                check(value).err().map(|error| FieldError { field, error })
            })
            .collect();

        if !self.segundo_apellido.trim().is_empty()
            && let Err(error) = validate_name(&self.segundo_apellido)
        {
            errors.push(FieldError {
                field: "segundo_apellido",
                error,
            });
        }

        if self.genero.is_none() {
            errors.push(FieldError {
                field: "genero",
                error: ValidationError::GenderRequired,
            });
        }

        let address: [(&'static str, &str); 4] = [
            ("municipio", self.municipio.as_str()),
            ("colonia", self.colonia.as_str()),
            ("codigo_postal", self.codigo_postal.as_str()),
            ("calle", self.calle.as_str()),
        ];
        for (field, value) in address {
            if let Err(error) = validate_required(value) {
                errors.push(FieldError { field, error });
            }
        }

        errors
    }
}
