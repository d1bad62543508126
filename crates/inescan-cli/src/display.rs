//! Vertical card display for reconciled records.
//!
//! Fields are grouped into sections; absent values print as a dash so the
//! person reviewing can see what still has to be typed in.

use inescan_core::{CanonicalRecord, PrefillReport};
use inescan_sync::HealthResponse;

const MISSING: &str = "-";

pub fn print_record_card(record: &CanonicalRecord) {
    let name = [
        record.nombres_display(),
        record.primer_apellido.as_deref(),
        record.segundo_apellido.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    if name.is_empty() {
        println!("=== (sin nombre) ===");
    } else {
        println!("=== {name} ===");
    }
    println!();

    print_section(
        "Datos personales",
        &[
            ("Nombre(s)", record.nombres_display()),
            ("Primer apellido", record.primer_apellido.as_deref()),
            ("Segundo apellido", record.segundo_apellido.as_deref()),
            ("CURP", record.curp.as_deref()),
            ("Clave de elector", record.clave_elector.as_deref()),
            ("Lugar de nacimiento", record.lugar_nacimiento.as_deref()),
            ("Fecha de nacimiento", record.fecha_nacimiento.as_deref()),
            ("Género", record.sexo.map(|g| g.as_str())),
        ],
    );

    print_section(
        "Domicilio",
        &[
            ("Municipio", record.municipio_display()),
            ("Colonia", record.colonia.as_deref()),
            ("Calle", record.calle.as_deref()),
            ("Número exterior", record.numero_exterior.as_deref()),
            ("Número interior", record.numero_interior.as_deref()),
            ("Código postal", record.codigo_postal.as_deref()),
        ],
    );

    if let Some(grade) = &record.calidad_extraccion {
        println!("  Calidad de extracción: {grade}");
    }
    if let Some(raw) = &record.sexo_no_reconocido {
        println!("  Género no reconocido: {raw:?}");
    }
    if let Some(raw) = &record.municipio_sin_normalizar {
        println!("  Municipio fuera de catálogo: {raw:?}");
    }
}

fn print_section(header: &str, rows: &[(&str, Option<&str>)]) {
    println!("{header}");
    for (label, value) in rows {
        println!("  {:<26} {}", label, value.unwrap_or(MISSING));
    }
    println!();
}

pub fn print_scan_summary(detected: usize, quality: Option<&str>, report: &PrefillReport) {
    println!("Resumen del escaneo");
    println!("  {:<26} {}", "Campos detectados", detected);
    println!("  {:<26} {}", "Calidad", quality.unwrap_or(MISSING));
    println!(
        "  {:<26} {}/{}",
        "Campos llenados",
        report.filled.len(),
        report.total
    );
    if !report.pending.is_empty() {
        println!("  Pendientes:");
        for label in &report.pending {
            println!("    - {label}");
        }
    }
}

pub fn print_health(base_url: &str, health: &HealthResponse) {
    println!("=== {base_url} ===");
    println!("  {:<26} {}", "Estado", health.status.as_deref().unwrap_or(MISSING));
    println!("  {:<26} {}", "Servicio", health.service.as_deref().unwrap_or(MISSING));
    println!("  {:<26} {}", "Versión", health.version.as_deref().unwrap_or(MISSING));
    let api = match health.api_configured {
        Some(true) => "sí",
        Some(false) => "no",
        None => MISSING,
    };
    println!("  {:<26} {}", "API de visión configurada", api);
}
