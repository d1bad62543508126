//! JSON bodies returned by the OCR backend.

use inescan_core::RawExtraction;
use serde::{Deserialize, Serialize};

/// Body of `POST /api/extract-ine-prd`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExtractResponse {
    pub success: bool,
    #[serde(default)]
    pub datos_prd: Option<RawExtraction>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub validaciones: Option<Validaciones>,
    #[serde(default)]
    pub debug_info: Option<DebugInfo>,
}

/// Backend-side plausibility flags for the extracted fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Validaciones {
    pub curp_valida: bool,
    pub clave_elector_valida: bool,
    pub nombres_detectados: bool,
    pub apellidos_detectados: bool,
    pub domicilio_detectado: bool,
    pub domicilio_completo: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebugInfo {
    /// Names of the fields the OCR pass found.
    pub campos_detectados: Vec<String>,
    pub texto_length: Option<u64>,
    pub imagen_size: Option<String>,
    pub archivo_size_mb: Option<f64>,
    pub backend_version: Option<String>,
}

/// Body of `GET /api/health`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthResponse {
    pub status: Option<String>,
    pub service: Option<String>,
    pub version: Option<String>,
    pub api_configured: Option<bool>,
}

impl ExtractResponse {
    /// Number of fields the backend reported as detected.
    pub fn detected_count(&self) -> usize {
        self.debug_info
            .as_ref()
            .map_or(0, |d| d.campos_detectados.len())
    }

    pub fn quality(&self) -> Option<&str> {
        self.datos_prd
            .as_ref()
            .and_then(|d| d.calidad_extraccion.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn full_success_body() {
        let json = r#"{
            "success": true,
            "datos_prd": {
                "curp": "ABCD900101HZSXYZ01",
                "nombres": "NO DETECTADO",
                "calidad_extraccion": "BUENA",
                "metodo_usado": "Railway + Google Vision API v7.0"
            },
            "validaciones": {"curp_valida": true, "nombres_detectados": false},
            "debug_info": {
                "campos_detectados": ["curp", "sexo"],
                "texto_length": 512,
                "imagen_size": "1024x640",
                "archivo_size_mb": 0.42,
                "backend_version": "7.0",
                "railway_optimized": true
            }
        }"#;
        let resp: ExtractResponse = serde_json::from_str(json).unwrap();
        assert!(resp.success);
        assert_eq!(resp.detected_count(), 2);
        assert_eq!(resp.quality(), Some("BUENA"));
        assert!(resp.validaciones.as_ref().unwrap().curp_valida);
        assert!(!resp.validaciones.unwrap().domicilio_completo);
        assert_eq!(
            resp.datos_prd.unwrap().curp.as_deref(),
            Some("ABCD900101HZSXYZ01")
        );
    }

    #[test]
    fn failure_body() {
        let resp: ExtractResponse =
            serde_json::from_str(r#"{"success": false, "error": "No se recibió imagen"}"#).unwrap();
        assert!(!resp.success);
        assert!(resp.datos_prd.is_none());
        assert_eq!(resp.detected_count(), 0);
    }

    #[test]
    fn health_body_ignores_extra_fields() {
        let json = r#"{
            "status": "OK",
            "service": "PRD Zacatecas Backend",
            "version": "7.0 - Railway",
            "api_configured": true,
            "endpoints": {"health": "/health"}
        }"#;
        let health: HealthResponse = serde_json::from_str(json).unwrap();
        assert_eq!(health.service.as_deref(), Some("PRD Zacatecas Backend"));
        assert_eq!(health.api_configured, Some(true));
    }
}
