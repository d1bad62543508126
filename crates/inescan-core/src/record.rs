//! Extraction records exchanged between the OCR backend, the reconciler and
//! the snapshot cache.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Placeholder the OCR backend writes for fields it could not read.
pub const NOT_DETECTED: &str = "NO DETECTADO";

/// Return the trimmed value of an optional field, or `None` when it is
/// missing, blank, or the [`NOT_DETECTED`] sentinel.
pub fn detected(value: &Option<String>) -> Option<&str> {
    let v = value.as_deref()?.trim();
    if v.is_empty() || v.eq_ignore_ascii_case(NOT_DETECTED) {
        None
    } else {
        Some(v)
    }
}

/// Identity fields as returned by the OCR service, one per upload.
///
/// Every field is optional and may hold the [`NOT_DETECTED`] sentinel.
/// Unknown keys (backend metadata such as `metodo_usado`) are kept in
/// `extra` so the record round-trips.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawExtraction {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre_completo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombres: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primer_apellido: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segundo_apellido: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clave_elector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sexo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fecha_nacimiento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colonia: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codigo_postal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_exterior: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_interior: Option<String>,
    /// Backend quality grade: `EXCELENTE`, `BUENA` or `REGULAR`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calidad_extraccion: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Gender as accepted by the affiliation form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Masculino,
    Femenino,
}

impl Gender {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Masculino => "masculino",
            Self::Femenino => "femenino",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Reconciled record, ready to populate the affiliation form.
///
/// Absent fields are omitted from JSON. `municipio` only ever holds a
/// canonical municipality name; a raw value that matched nothing is kept in
/// `municipio_sin_normalizar` instead. Likewise an unrecognised gender
/// marker is kept verbatim in `sexo_no_reconocido`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CanonicalRecord {
    /// Full name as read, kept even when it could not be split.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombre_completo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub primer_apellido: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub segundo_apellido: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub nombres: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub curp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clave_elector: Option<String>,
    /// State name decoded from the CURP.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lugar_nacimiento: Option<String>,
    /// `DD/MM/YYYY`.
    #[serde(
        default,
        alias = "fecha_nacimiond",
        skip_serializing_if = "Option::is_none"
    )]
    pub fecha_nacimiento: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sexo: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sexo_no_reconocido: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipio: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub municipio_sin_normalizar: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub colonia: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub codigo_postal: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_exterior: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub numero_interior: Option<String>,
    /// Backend quality grade, passed through.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calidad_extraccion: Option<String>,
}

impl CanonicalRecord {
    /// Number of populated fields, not counting the unnormalised leftovers,
    /// the full name or the quality grade.
    pub fn populated(&self) -> usize {
        [
            self.primer_apellido.is_some(),
            self.segundo_apellido.is_some(),
            self.nombres.is_some(),
            self.curp.is_some(),
            self.clave_elector.is_some(),
            self.lugar_nacimiento.is_some(),
            self.fecha_nacimiento.is_some(),
            self.sexo.is_some(),
            self.municipio.is_some(),
            self.calle.is_some(),
            self.colonia.is_some(),
            self.codigo_postal.is_some(),
            self.numero_exterior.is_some(),
            self.numero_interior.is_some(),
        ]
        .iter()
        .filter(|&&set| set)
        .count()
    }

    /// Given names to show: the split part, or the unsplit full name when
    /// it could not be divided into surnames and given names.
    pub fn nombres_display(&self) -> Option<&str> {
        self.nombres.as_deref().or_else(|| {
            if self.primer_apellido.is_none() {
                self.nombre_completo.as_deref()
            } else {
                None
            }
        })
    }

    /// Municipality as the person should see it: canonical when matched,
    /// raw text otherwise.
    pub fn municipio_display(&self) -> Option<&str> {
        self.municipio
            .as_deref()
            .or(self.municipio_sin_normalizar.as_deref())
    }
}
