//! Reference tables: CURP state codes and municipality spelling variants.
//!
//! Both tables are ordered lists, not maps. Municipality matching is
//! first-match in declaration order, and several variants are substrings of
//! others (`"nochistlan"` / `"nochistlan de mejia"`, `"gonzalez ortega"`
//! appears in two municipalities), so the order is part of the contract.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum TablesError {
    #[error("reference tables JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("reference table '{0}' is empty")]
    Empty(&'static str),

    #[error("state code must be two ASCII letters, got {0:?}")]
    InvalidStateCode(String),

    #[error("municipality {0:?} has no accepted variants")]
    NoVariants(String),
}

/// A two-letter CURP birthplace code and its display name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateCode {
    pub code: String,
    pub name: String,
}

/// A canonical municipality name and the spellings that map to it.
///
/// Variants are stored lower-cased and trimmed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MunicipalityAliases {
    pub canonical: String,
    pub variants: Vec<String>,
}

impl MunicipalityAliases {
    pub fn new(canonical: &str, variants: &[&str]) -> Self {
        Self {
            canonical: canonical.to_string(),
            variants: variants.iter().map(|v| v.trim().to_lowercase()).collect(),
        }
    }
}

/// Immutable lookup data for the reconciler, loaded once at startup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReferenceTables {
    pub states: Vec<StateCode>,
    pub municipalities: Vec<MunicipalityAliases>,
}

impl Default for ReferenceTables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ReferenceTables {
    /// The 32 federal entities plus `NE` (born abroad), and the 58
    /// municipalities of Zacatecas.
    pub fn builtin() -> Self {
        let states = STATE_CODES
            .iter()
            .map(|(code, name)| StateCode {
                code: (*code).to_string(),
                name: (*name).to_string(),
            })
            .collect();
        let municipalities = ZACATECAS_MUNICIPALITIES
            .iter()
            .map(|(canonical, variants)| MunicipalityAliases::new(canonical, variants))
            .collect();
        Self {
            states,
            municipalities,
        }
    }

    /// Load tables for another region from JSON of the form
    /// `{"states": [{"code", "name"}], "municipalities": [{"canonical", "variants"}]}`.
    ///
    /// Codes are upper-cased and variants lower-cased; declaration order is
    /// preserved.
    pub fn from_json(json: &str) -> Result<Self, TablesError> {
        let mut tables: ReferenceTables = serde_json::from_str(json)?;

        if tables.states.is_empty() {
            return Err(TablesError::Empty("states"));
        }
        if tables.municipalities.is_empty() {
            return Err(TablesError::Empty("municipalities"));
        }

        for state in &mut tables.states {
            let code = state.code.trim().to_ascii_uppercase();
            if code.len() != 2 || !code.bytes().all(|b| b.is_ascii_uppercase()) {
                return Err(TablesError::InvalidStateCode(state.code.clone()));
            }
            state.code = code;
        }

        for m in &mut tables.municipalities {
            m.variants = m
                .variants
                .iter()
                .map(|v| v.trim().to_lowercase())
                .filter(|v| !v.is_empty())
                .collect();
            if m.variants.is_empty() {
                return Err(TablesError::NoVariants(m.canonical.clone()));
            }
        }

        debug!(
            states = tables.states.len(),
            municipalities = tables.municipalities.len(),
            "loaded reference tables"
        );
        Ok(tables)
    }

    /// Display name for a two-letter state code (case-insensitive).
    pub fn state_name(&self, code: &str) -> Option<&str> {
        self.states
            .iter()
            .find(|s| s.code.eq_ignore_ascii_case(code))
            .map(|s| s.name.as_str())
    }

    /// Whether `name` is exactly one of the canonical municipality names.
    pub fn is_canonical_municipality(&self, name: &str) -> bool {
        self.municipalities.iter().any(|m| m.canonical == name)
    }
}

// ── Built-in data ──

/// CURP birthplace codes (RENAPO), in catalogue order.
pub const STATE_CODES: &[(&str, &str)] = &[
    ("AS", "Aguascalientes"),
    ("BC", "Baja California"),
    ("BS", "Baja California Sur"),
    ("CC", "Campeche"),
    ("CL", "Coahuila"),
    ("CM", "Colima"),
    ("CS", "Chiapas"),
    ("CH", "Chihuahua"),
    ("DF", "Ciudad de México"),
    ("DG", "Durango"),
    ("GT", "Guanajuato"),
    ("GR", "Guerrero"),
    ("HG", "Hidalgo"),
    ("JC", "Jalisco"),
    ("MC", "Estado de México"),
    ("MN", "Michoacán"),
    ("MS", "Morelos"),
    ("NT", "Nayarit"),
    ("NL", "Nuevo León"),
    ("OC", "Oaxaca"),
    ("PL", "Puebla"),
    ("QT", "Querétaro"),
    ("QR", "Quintana Roo"),
    ("SP", "San Luis Potosí"),
    ("SL", "Sinaloa"),
    ("SR", "Sonora"),
    ("TC", "Tabasco"),
    ("TS", "Tamaulipas"),
    ("TL", "Tlaxcala"),
    ("VZ", "Veracruz"),
    ("YN", "Yucatán"),
    ("ZS", "Zacatecas"),
    ("NE", "Nacido en el Extranjero"),
];

/// Zacatecas municipalities in INEGI order (001-058) with accepted spellings.
///
/// The first variant of each entry is the lower-cased canonical name.
pub const ZACATECAS_MUNICIPALITIES: &[(&str, &[&str])] = &[
    ("Apozol", &["apozol"]),
    ("Apulco", &["apulco"]),
    ("Atolinga", &["atolinga"]),
    (
        "Benito Juárez",
        &[
            "benito juárez",
            "benito juarez",
            "florencia de benito juárez",
            "florencia de benito juarez",
            "florencia",
        ],
    ),
    (
        "Calera",
        &[
            "calera",
            "calera de víctor rosales",
            "calera de victor rosales",
            "víctor rosales",
            "victor rosales",
        ],
    ),
    (
        "Cañitas de Felipe Pescador",
        &[
            "cañitas de felipe pescador",
            "canitas de felipe pescador",
            "cañitas",
            "canitas",
        ],
    ),
    (
        "Concepción del Oro",
        &["concepción del oro", "concepcion del oro"],
    ),
    (
        "Cuauhtémoc",
        &["cuauhtémoc", "cuauhtemoc", "san pedro piedra gorda"],
    ),
    ("Chalchihuites", &["chalchihuites"]),
    (
        "Fresnillo",
        &[
            "fresnillo",
            "fresnillo de gonzález echeverría",
            "fresnillo de gonzalez echeverria",
        ],
    ),
    (
        "Trinidad García de la Cadena",
        &[
            "trinidad garcía de la cadena",
            "trinidad garcia de la cadena",
            "garcía de la cadena",
            "garcia de la cadena",
        ],
    ),
    ("Genaro Codina", &["genaro codina"]),
    (
        "General Enrique Estrada",
        &[
            "general enrique estrada",
            "gral. enrique estrada",
            "enrique estrada",
        ],
    ),
    (
        "General Francisco R. Murguía",
        &[
            "general francisco r. murguía",
            "general francisco r. murguia",
            "francisco r. murguía",
            "francisco r. murguia",
            "nieves",
        ],
    ),
    (
        "El Plateado de Joaquín Amaro",
        &[
            "el plateado de joaquín amaro",
            "el plateado de joaquin amaro",
            "joaquín amaro",
            "joaquin amaro",
            "el plateado",
        ],
    ),
    (
        "General Pánfilo Natera",
        &[
            "general pánfilo natera",
            "general panfilo natera",
            "pánfilo natera",
            "panfilo natera",
        ],
    ),
    ("Guadalupe", &["guadalupe"]),
    ("Huanusco", &["huanusco"]),
    ("Jalpa", &["jalpa"]),
    (
        "Jerez",
        &["jerez", "jerez de garcía salinas", "jerez de garcia salinas"],
    ),
    ("Jiménez del Teul", &["jiménez del teul", "jimenez del teul"]),
    ("Juan Aldama", &["juan aldama"]),
    ("Juchipila", &["juchipila"]),
    ("Loreto", &["loreto"]),
    ("Luis Moya", &["luis moya"]),
    ("Mazapil", &["mazapil"]),
    ("Melchor Ocampo", &["melchor ocampo"]),
    ("Mezquital del Oro", &["mezquital del oro"]),
    ("Miguel Auza", &["miguel auza"]),
    ("Momax", &["momax"]),
    ("Monte Escobedo", &["monte escobedo"]),
    ("Morelos", &["morelos"]),
    ("Moyahua de Estrada", &["moyahua de estrada", "moyahua"]),
    (
        "Nochistlán de Mejía",
        &[
            "nochistlán de mejía",
            "nochistlan de mejia",
            "nochistlán",
            "nochistlan",
        ],
    ),
    ("Noria de Ángeles", &["noria de ángeles", "noria de angeles"]),
    ("Ojocaliente", &["ojocaliente", "ojo caliente"]),
    ("Pánuco", &["pánuco", "panuco"]),
    ("Pinos", &["pinos"]),
    ("Río Grande", &["río grande", "rio grande"]),
    ("Sain Alto", &["sain alto", "saín alto"]),
    ("El Salvador", &["el salvador"]),
    ("Sombrerete", &["sombrerete"]),
    ("Susticacán", &["susticacán", "susticacan"]),
    ("Tabasco", &["tabasco"]),
    ("Tepechitlán", &["tepechitlán", "tepechitlan"]),
    ("Tepetongo", &["tepetongo"]),
    (
        "Teúl de González Ortega",
        &[
            "teúl de gonzález ortega",
            "teul de gonzalez ortega",
            "el teúl",
            "el teul",
        ],
    ),
    (
        "Tlaltenango de Sánchez Román",
        &[
            "tlaltenango de sánchez román",
            "tlaltenango de sanchez roman",
        ],
    ),
    ("Valparaíso", &["valparaíso", "valparaiso"]),
    ("Vetagrande", &["vetagrande", "veta grande"]),
    ("Villa de Cos", &["villa de cos"]),
    ("Villa García", &["villa garcía", "villa garcia"]),
    (
        "Villa González Ortega",
        &["villa gonzález ortega", "villa gonzalez ortega"],
    ),
    ("Villa Hidalgo", &["villa hidalgo"]),
    ("Villanueva", &["villanueva"]),
    ("Zacatecas", &["zacatecas"]),
    ("Trancoso", &["trancoso"]),
    ("Santa María de la Paz", &["santa maría de la paz", "santa maria de la paz"]),
];
