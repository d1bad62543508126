//! Field reconciliation: turns a [`RawExtraction`] into a [`CanonicalRecord`].
//!
//! Every derivation is independent and best-effort. A step that cannot run
//! (missing input, short ID string, unknown code) yields `None` and the
//! corresponding field stays absent; nothing here returns an error, since
//! the pre-filled form is always reviewed by a person afterwards.

use tracing::{debug, trace};

use crate::record::{CanonicalRecord, Gender, RawExtraction, detected};
use crate::tables::ReferenceTables;
use crate::validate::clean_id;

/// Two-digit birth years up to and including this value belong to the 2000s.
pub const YEAR_PIVOT: u32 = 30;

/// Surname and given-name parts of a full name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameParts {
    pub primer_apellido: String,
    pub segundo_apellido: Option<String>,
    pub nombres: String,
}

/// Split a full name written surname-first, as printed on the INE credential.
///
/// - 3+ tokens: first surname, second surname, remaining tokens as given names
/// - 2 tokens: first surname, given name
/// - fewer: `None`, the name is left unsplit
pub fn split_name(full: &str) -> Option<NameParts> {
    let tokens: Vec<&str> = full.split_whitespace().collect();
    match tokens.as_slice() {
        [first, second, rest @ ..] if !rest.is_empty() => Some(NameParts {
            primer_apellido: (*first).to_string(),
            segundo_apellido: Some((*second).to_string()),
            nombres: rest.join(" "),
        }),
        [first, second] => Some(NameParts {
            primer_apellido: (*first).to_string(),
            segundo_apellido: None,
            nombres: (*second).to_string(),
        }),
        _ => None,
    }
}

/// Decode the birth date embedded in a CURP (`AAAA YYMMDD ...`).
///
/// Characters 4-6 are the year, 6-8 the month, 8-10 the day. Month and day
/// are passed through as written; only the year must be numeric, because it
/// is expanded with the fixed [`YEAR_PIVOT`]: `00..=30` → 20xx, `31..=99` → 19xx.
///
/// Returns `DD/MM/YYYY`, or `None` when the ID is shorter than 10 characters
/// or the year is not two digits.
pub fn decode_birth_date(id: &str) -> Option<String> {
    let chars: Vec<char> = id.chars().collect();
    if chars.len() < 10 {
        return None;
    }

    let yy: String = chars[4..6].iter().collect();
    let mm: String = chars[6..8].iter().collect();
    let dd: String = chars[8..10].iter().collect();

    if !yy.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    let short_year: u32 = yy.parse().ok()?;
    let year = if short_year <= YEAR_PIVOT {
        2000 + short_year
    } else {
        1900 + short_year
    };

    Some(format!("{dd}/{mm}/{year}"))
}

/// Normalise a gender marker.
///
/// Case-insensitive: anything containing `masculino`, or exactly `H`
/// (hombre), is [`Gender::Masculino`]; anything containing `femenino`, or
/// exactly `M` (mujer), is [`Gender::Femenino`]. Everything else is `None`.
pub fn normalize_gender(value: &str) -> Option<Gender> {
    let v = value.trim().to_lowercase();
    if v.contains("masculino") || v == "h" {
        Some(Gender::Masculino)
    } else if v.contains("femenino") || v == "m" {
        Some(Gender::Femenino)
    } else {
        None
    }
}

/// Reconciles raw OCR output against a set of [`ReferenceTables`].
///
/// Construct one at startup and hand it to whatever needs it; the tables
/// are never mutated afterwards.
#[derive(Debug, Clone, Default)]
pub struct Reconciler {
    tables: ReferenceTables,
}

impl Reconciler {
    pub fn new(tables: ReferenceTables) -> Self {
        Self { tables }
    }

    pub fn tables(&self) -> &ReferenceTables {
        &self.tables
    }

    /// State name for the two characters at offset 11 of a CURP.
    ///
    /// Requires at least 12 characters; unknown codes yield `None`.
    pub fn decode_birthplace(&self, id: &str) -> Option<String> {
        let chars: Vec<char> = id.chars().collect();
        if chars.len() < 12 {
            return None;
        }
        let end = chars.len().min(13);
        let code: String = chars[11..end].iter().collect();
        let name = self.tables.state_name(&code);
        if name.is_none() {
            debug!(code = %code, "unknown CURP state code");
        }
        name.map(str::to_string)
    }

    /// Map a free-text municipality onto its canonical name.
    ///
    /// Two passes over the alias table, both in declaration order, first
    /// match wins:
    ///
    /// 1. exact, case-insensitive equality with a variant
    /// 2. substring containment in either direction
    ///
    /// Returns `None` when neither pass matches; the caller keeps the raw
    /// text.
    pub fn reconcile_municipality(&self, value: &str) -> Option<&str> {
        let input = value.trim().to_lowercase();
        if input.is_empty() {
            return None;
        }

        for m in &self.tables.municipalities {
            if m.variants.iter().any(|v| *v == input) {
                trace!(input = %input, canonical = %m.canonical, "exact municipality match");
                return Some(m.canonical.as_str());
            }
        }

        for m in &self.tables.municipalities {
            if m
                .variants
                .iter()
                .any(|v| v.contains(input.as_str()) || input.contains(v.as_str()))
            {
                trace!(input = %input, canonical = %m.canonical, "partial municipality match");
                return Some(m.canonical.as_str());
            }
        }

        debug!(input = %input, "municipality not in reference table");
        None
    }

    /// Produce the canonical record for one extraction.
    ///
    /// - Name parts come from splitting `nombre_completo` when it has two or
    ///   more tokens, otherwise from the pre-split raw fields. The full name
    ///   itself is always kept, split or not.
    /// - Birthplace and birth date are decoded from the cleaned CURP; a
    ///   detected raw `fecha_nacimiento` is kept when decoding fails.
    /// - Sentinel and blank values are never copied.
    pub fn reconcile(&self, raw: &RawExtraction) -> CanonicalRecord {
        let mut record = CanonicalRecord {
            nombre_completo: owned(&raw.nombre_completo),
            calidad_extraccion: owned(&raw.calidad_extraccion),
            ..Default::default()
        };

        match detected(&raw.nombre_completo).and_then(split_name) {
            Some(parts) => {
                record.primer_apellido = Some(parts.primer_apellido);
                record.segundo_apellido = parts.segundo_apellido;
                record.nombres = Some(parts.nombres);
            }
            None => {
                record.primer_apellido = owned(&raw.primer_apellido);
                record.segundo_apellido = owned(&raw.segundo_apellido);
                record.nombres = owned(&raw.nombres);
            }
        }

        if let Some(curp) = detected(&raw.curp).map(clean_id).filter(|c| !c.is_empty()) {
            record.lugar_nacimiento = self.decode_birthplace(&curp);
            record.fecha_nacimiento = decode_birth_date(&curp);
            record.curp = Some(curp);
        }
        if record.fecha_nacimiento.is_none() {
            record.fecha_nacimiento = owned(&raw.fecha_nacimiento);
        }

        record.clave_elector = detected(&raw.clave_elector)
            .map(clean_id)
            .filter(|c| !c.is_empty());

        if let Some(sexo) = detected(&raw.sexo) {
            match normalize_gender(sexo) {
                Some(g) => record.sexo = Some(g),
                None => record.sexo_no_reconocido = Some(sexo.to_string()),
            }
        }

        if let Some(municipio) = detected(&raw.municipio) {
            match self.reconcile_municipality(municipio) {
                Some(canonical) => record.municipio = Some(canonical.to_string()),
                None => record.municipio_sin_normalizar = Some(municipio.to_string()),
            }
        }

        record.calle = owned(&raw.calle);
        record.colonia = owned(&raw.colonia);
        record.codigo_postal = owned(&raw.codigo_postal);
        record.numero_exterior = owned(&raw.numero_exterior);
        record.numero_interior = owned(&raw.numero_interior);

        debug!(
            populated = record.populated(),
            birthplace = record.lugar_nacimiento.is_some(),
            birth_date = record.fecha_nacimiento.is_some(),
            municipio_canonical = record.municipio.is_some(),
            "reconciled extraction"
        );
        record
    }
}

fn owned(value: &Option<String>) -> Option<String> {
    detected(value).map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NOT_DETECTED;

    fn reconciler() -> Reconciler {
        Reconciler::default()
    }

    // ── Names ──

    #[test]
    fn split_three_or_more_tokens() {
        let parts = split_name("PEREZ LOPEZ JUAN CARLOS").unwrap();
        assert_eq!(parts.primer_apellido, "PEREZ");
        assert_eq!(parts.segundo_apellido.as_deref(), Some("LOPEZ"));
        assert_eq!(parts.nombres, "JUAN CARLOS");
    }

    #[test]
    fn split_two_tokens() {
        let parts = split_name("PEREZ JUAN").unwrap();
        assert_eq!(parts.primer_apellido, "PEREZ");
        assert_eq!(parts.segundo_apellido, None);
        assert_eq!(parts.nombres, "JUAN");
    }

    #[test]
    fn split_fewer_than_two_tokens_is_noop() {
        assert_eq!(split_name("JUAN"), None);
        assert_eq!(split_name("   "), None);
        assert_eq!(split_name(""), None);
    }

    #[test]
    fn split_is_lossless() {
        for full in [
            "A B C",
            "GARCIA  MARTINEZ   MARIA DE LOS ANGELES",
            " DE LA CRUZ ROSA MARIA ",
            "Núñez Ávila José Ángel",
        ] {
            let parts = split_name(full).unwrap();
            let rebuilt = format!(
                "{} {} {}",
                parts.primer_apellido,
                parts.segundo_apellido.unwrap(),
                parts.nombres
            );
            let original: Vec<&str> = full.split_whitespace().collect();
            assert_eq!(rebuilt, original.join(" "), "{full:?}");
        }
    }

    // ── CURP decoding ──

    #[test]
    fn birth_date_pivot_year() {
        assert_eq!(
            decode_birth_date("ABCD300101HZSXYZ01").as_deref(),
            Some("01/01/2030")
        );
        assert_eq!(
            decode_birth_date("ABCD310101HZSXYZ01").as_deref(),
            Some("01/01/1931")
        );
        assert_eq!(
            decode_birth_date("ABCD001231MZSXYZ01").as_deref(),
            Some("31/12/2000")
        );
        assert_eq!(
            decode_birth_date("ABCD900101HZSXYZ01").as_deref(),
            Some("01/01/1990")
        );
    }

    #[test]
    fn birth_date_needs_ten_characters() {
        assert_eq!(decode_birth_date(""), None);
        assert_eq!(decode_birth_date("ABCD90010"), None);
        assert_eq!(decode_birth_date("ABCD900101").as_deref(), Some("01/01/1990"));
    }

    #[test]
    fn birth_date_passes_month_and_day_through() {
        assert_eq!(decode_birth_date("ABCD85XY0Z").as_deref(), Some("0Z/XY/1985"));
    }

    #[test]
    fn birth_date_non_numeric_year_is_absent() {
        assert_eq!(decode_birth_date("ABCDX90101HZS"), None);
        assert_eq!(decode_birth_date("ABCD-90101HZS"), None);
    }

    #[test]
    fn birthplace_for_every_declared_code() {
        let r = reconciler();
        for state in &r.tables().states {
            let id = format!("ABCD900101H{}XYZ01", state.code);
            assert_eq!(r.decode_birthplace(&id).as_deref(), Some(state.name.as_str()));
        }
    }

    #[test]
    fn birthplace_unknown_or_short() {
        let r = reconciler();
        assert_eq!(r.decode_birthplace("ABCD900101HQQXYZ01"), None);
        assert_eq!(r.decode_birthplace("ABCD900101H"), None);
        // Twelve characters leaves a one-letter code, which is never in the table.
        assert_eq!(r.decode_birthplace("ABCD900101HZ"), None);
    }

    // ── Gender ──

    #[test]
    fn gender_words_any_case() {
        assert_eq!(normalize_gender("MASCULINO"), Some(Gender::Masculino));
        assert_eq!(normalize_gender("Sexo: masculino"), Some(Gender::Masculino));
        assert_eq!(normalize_gender("Femenino"), Some(Gender::Femenino));
    }

    #[test]
    fn gender_source_letters() {
        assert_eq!(normalize_gender("H"), Some(Gender::Masculino));
        assert_eq!(normalize_gender("h"), Some(Gender::Masculino));
        assert_eq!(normalize_gender("m"), Some(Gender::Femenino));
        assert_eq!(normalize_gender(" M "), Some(Gender::Femenino));
    }

    #[test]
    fn gender_unrecognised_is_none() {
        assert_eq!(normalize_gender("otro"), None);
        assert_eq!(normalize_gender("HM"), None);
        assert_eq!(normalize_gender(""), None);
    }

    // ── Municipality ──

    #[test]
    fn municipality_exact_match() {
        let r = reconciler();
        assert_eq!(r.reconcile_municipality("fresnillo"), Some("Fresnillo"));
        assert_eq!(r.reconcile_municipality("  JEREZ "), Some("Jerez"));
        assert_eq!(
            r.reconcile_municipality("Canitas de Felipe Pescador"),
            Some("Cañitas de Felipe Pescador")
        );
    }

    #[test]
    fn municipality_partial_match() {
        let r = reconciler();
        assert_eq!(
            r.reconcile_municipality("Tlaltenango"),
            Some("Tlaltenango de Sánchez Román")
        );
        assert_eq!(
            r.reconcile_municipality("MPIO. DE SOMBRERETE ZAC."),
            Some("Sombrerete")
        );
    }

    #[test]
    fn municipality_partial_match_follows_table_order() {
        // Both Teúl and Villa González Ortega contain this; Teúl is declared first.
        let r = reconciler();
        assert_eq!(
            r.reconcile_municipality("gonzalez ortega"),
            Some("Teúl de González Ortega")
        );
    }

    #[test]
    fn municipality_no_match() {
        let r = reconciler();
        assert_eq!(r.reconcile_municipality("Ciudad Inventada"), None);
        assert_eq!(r.reconcile_municipality("   "), None);
    }

    #[test]
    fn municipality_is_idempotent() {
        let r = reconciler();
        for m in &r.tables().municipalities {
            assert_eq!(
                r.reconcile_municipality(&m.canonical),
                Some(m.canonical.as_str())
            );
        }
    }

    // ── Whole record ──

    #[test]
    fn reconcile_full_record() {
        let raw = RawExtraction {
            nombre_completo: Some("PEREZ LOPEZ JUAN CARLOS".into()),
            curp: Some("abcd900101hzsxyz01".into()),
            clave_elector: Some("PRLPJN90010132H100".into()),
            sexo: Some("H".into()),
            municipio: Some("jerez".into()),
            calle: Some("AV. HIDALGO".into()),
            colonia: Some(NOT_DETECTED.into()),
            codigo_postal: Some("99300".into()),
            ..Default::default()
        };
        let record = reconciler().reconcile(&raw);
        assert_eq!(record.primer_apellido.as_deref(), Some("PEREZ"));
        assert_eq!(record.segundo_apellido.as_deref(), Some("LOPEZ"));
        assert_eq!(record.nombres.as_deref(), Some("JUAN CARLOS"));
        assert_eq!(record.curp.as_deref(), Some("ABCD900101HZSXYZ01"));
        assert_eq!(record.lugar_nacimiento.as_deref(), Some("Zacatecas"));
        assert_eq!(record.fecha_nacimiento.as_deref(), Some("01/01/1990"));
        assert_eq!(record.sexo, Some(Gender::Masculino));
        assert_eq!(record.municipio.as_deref(), Some("Jerez"));
        assert_eq!(record.calle.as_deref(), Some("AV. HIDALGO"));
        assert_eq!(record.colonia, None);
        assert_eq!(record.codigo_postal.as_deref(), Some("99300"));
    }

    #[test]
    fn reconcile_uses_pre_split_parts_when_full_name_is_short() {
        let raw = RawExtraction {
            nombre_completo: Some("JUAN".into()),
            primer_apellido: Some("PEREZ".into()),
            segundo_apellido: Some(NOT_DETECTED.into()),
            nombres: Some("JUAN".into()),
            ..Default::default()
        };
        let record = reconciler().reconcile(&raw);
        assert_eq!(record.primer_apellido.as_deref(), Some("PEREZ"));
        assert_eq!(record.segundo_apellido, None);
        assert_eq!(record.nombres.as_deref(), Some("JUAN"));
    }

    #[test]
    fn reconcile_sentinel_full_name_is_ignored() {
        let raw = RawExtraction {
            nombre_completo: Some(NOT_DETECTED.into()),
            ..Default::default()
        };
        let record = reconciler().reconcile(&raw);
        assert_eq!(record, CanonicalRecord::default());
    }

    #[test]
    fn reconcile_keeps_single_word_full_name() {
        let raw = RawExtraction {
            nombre_completo: Some("MADONNA".into()),
            calidad_extraccion: Some("REGULAR".into()),
            ..Default::default()
        };
        let record = reconciler().reconcile(&raw);
        assert_eq!(record.nombre_completo.as_deref(), Some("MADONNA"));
        assert_eq!(record.primer_apellido, None);
        assert_eq!(record.nombres, None);
        assert_eq!(record.nombres_display(), Some("MADONNA"));
        assert_eq!(record.calidad_extraccion.as_deref(), Some("REGULAR"));

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["nombre_completo"], "MADONNA");
    }

    #[test]
    fn reconcile_keeps_unmatched_values_aside() {
        let raw = RawExtraction {
            sexo: Some("otro".into()),
            municipio: Some("Ciudad Inventada".into()),
            ..Default::default()
        };
        let record = reconciler().reconcile(&raw);
        assert_eq!(record.sexo, None);
        assert_eq!(record.sexo_no_reconocido.as_deref(), Some("otro"));
        assert_eq!(record.municipio, None);
        assert_eq!(
            record.municipio_sin_normalizar.as_deref(),
            Some("Ciudad Inventada")
        );
    }

    #[test]
    fn reconcile_short_curp_keeps_raw_birth_date() {
        let raw = RawExtraction {
            curp: Some("ABCD9".into()),
            fecha_nacimiento: Some("15/03/1982".into()),
            ..Default::default()
        };
        let record = reconciler().reconcile(&raw);
        assert_eq!(record.curp.as_deref(), Some("ABCD9"));
        assert_eq!(record.lugar_nacimiento, None);
        assert_eq!(record.fecha_nacimiento.as_deref(), Some("15/03/1982"));
    }

    #[test]
    fn reconcile_cleans_ids_before_decoding() {
        let raw = RawExtraction {
            curp: Some("ABCD 900101 HZS XYZ01".into()),
            clave_elector: Some("prlpjn-90010132-h100".into()),
            ..Default::default()
        };
        let record = reconciler().reconcile(&raw);
        assert_eq!(record.curp.as_deref(), Some("ABCD900101HZSXYZ01"));
        assert_eq!(record.lugar_nacimiento.as_deref(), Some("Zacatecas"));
        assert_eq!(record.clave_elector.as_deref(), Some("PRLPJN90010132H100"));
    }
}
