//! Static emergency protocol table.
//!
//! Each classification label maps to an immutable protocol record: which
//! circles participate, per-circle message templates, the minimum severity
//! tier, whether the emergency line should be called, and the re-escalation
//! timeout. Classifications are data, not behavior; runtime adjustments for
//! weapons and injuries are applied on top of the static entry.

use serde::Serialize;

use crate::models::Tier;

/// Canonical emergency classification parsed from a free-text label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertKind {
    Seguridad,
    Salud,
    Violencia,
    Incendio,
    Caida,
    Emergencia,
    Robo,
    /// Preventive suspicious-activity watch, used by the vigilance engine.
    Sospecha,
    Otro,
}

impl AlertKind {
    /// Parses a free-text classification label. Unknown labels map to `Otro`.
    pub fn parse(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        if label.starts_with("robo") {
            return AlertKind::Robo;
        }
        match label.as_str() {
            "seguridad" => AlertKind::Seguridad,
            "salud" => AlertKind::Salud,
            "violencia" => AlertKind::Violencia,
            "incendio" => AlertKind::Incendio,
            "caida" | "caída" => AlertKind::Caida,
            "emergencia" => AlertKind::Emergencia,
            "sospecha" | "vigilancia" => AlertKind::Sospecha,
            _ => AlertKind::Otro,
        }
    }

    /// Classifications where any institution type may respond.
    fn admits_all_institutions(self) -> bool {
        matches!(self, AlertKind::Emergencia | AlertKind::Caida | AlertKind::Otro)
    }
}

/// Participating circles of a protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct CircleSet {
    pub personal: bool,
    pub community: bool,
    pub police: bool,
    pub ambulance: bool,
    pub fire: bool,
}

/// Runtime facts that adjust the static table entry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RuntimeFlags {
    pub weapon: bool,
    pub injuries: bool,
}

impl RuntimeFlags {
    /// Derives flags from the raw label itself, e.g. "robo_armado".
    pub fn from_label(label: &str) -> Self {
        let label = label.trim().to_lowercase();
        Self {
            weapon: label.contains("armado") || label.contains("armada") || label.contains("arma_"),
            injuries: label.contains("herid") || AlertKind::parse(&label) == AlertKind::Caida,
        }
    }

    pub fn merge(self, other: Self) -> Self {
        Self {
            weapon: self.weapon || other.weapon,
            injuries: self.injuries || other.injuries,
        }
    }
}

/// A resolved response protocol for one classification.
#[derive(Debug, Clone, Serialize)]
pub struct Protocol {
    pub kind: AlertKind,
    pub circles: CircleSet,
    pub min_tier: Tier,
    pub call_emergency_line: bool,
    pub reescalation_timeout_min: u32,
    pub preventive_only: bool,
    personal_template: &'static str,
    institutional_template: &'static str,
    community_template: &'static str,
}

/// Placeholder values rendered into message templates.
#[derive(Debug, Clone, Default)]
pub struct MessageContext {
    pub nombre: String,
    pub ubicacion: Option<String>,
    pub distancia_km: Option<f64>,
    pub descripcion: Option<String>,
}

/// The three per-circle messages, rendered independently so recipients in
/// one circle can never observe another circle's text.
#[derive(Debug, Clone)]
pub struct CircleMessages {
    pub personal: String,
    pub institutional: String,
    pub community: String,
}

impl Protocol {
    /// Whether an institution of `tipo` may respond under this protocol.
    /// Untyped institutions are always admitted when any institutional
    /// circle participates.
    pub fn admits_institution(&self, tipo: &str) -> bool {
        if self.kind.admits_all_institutions() {
            return true;
        }
        let tipo = tipo.trim().to_lowercase();
        if tipo.is_empty() && (self.circles.police || self.circles.ambulance || self.circles.fire) {
            return true;
        }
        (self.circles.police && matches!(tipo.as_str(), "policia" | "seguridad"))
            || (self.circles.ambulance && matches!(tipo.as_str(), "ambulancia" | "salud"))
            || (self.circles.fire && matches!(tipo.as_str(), "bomberos" | "emergencia"))
    }

    /// Renders the three circle messages from one context.
    pub fn render_messages(&self, ctx: &MessageContext) -> CircleMessages {
        CircleMessages {
            personal: render(self.personal_template, ctx),
            institutional: render(self.institutional_template, ctx),
            community: render(self.community_template, ctx),
        }
    }
}

fn render(template: &str, ctx: &MessageContext) -> String {
    template
        .replace("{nombre}", &ctx.nombre)
        .replace(
            "{ubicacion}",
            ctx.ubicacion.as_deref().unwrap_or("ubicación desconocida"),
        )
        .replace(
            "{distancia}",
            &ctx.distancia_km
                .map(|d| format!("{d:.2} km"))
                .unwrap_or_else(|| "cerca".to_string()),
        )
        .replace(
            "{descripcion}",
            ctx.descripcion.as_deref().unwrap_or("sin más detalles"),
        )
}

/// Static lookup from classification to protocol.
pub struct ProtocolTable;

impl ProtocolTable {
    /// Base table entry for a classification.
    fn base(kind: AlertKind) -> Protocol {
        match kind {
            AlertKind::Seguridad => Protocol {
                kind,
                circles: CircleSet { personal: true, police: true, community: true, ..Default::default() },
                min_tier: Tier::Grave,
                call_emergency_line: false,
                reescalation_timeout_min: 5,
                preventive_only: false,
                personal_template: "🚨 {nombre} reporta un problema de seguridad en {ubicacion}. {descripcion}",
                institutional_template: "Alerta de seguridad a {distancia}: {nombre} en {ubicacion}. {descripcion}",
                community_template: "Vecino en riesgo a {distancia}: {nombre} necesita ayuda en {ubicacion}.",
            },
            AlertKind::Salud => Protocol {
                kind,
                circles: CircleSet { personal: true, ambulance: true, community: true, ..Default::default() },
                min_tier: Tier::Grave,
                call_emergency_line: true,
                reescalation_timeout_min: 5,
                preventive_only: false,
                personal_template: "🚑 {nombre} tiene una emergencia de salud en {ubicacion}. {descripcion}",
                institutional_template: "Emergencia médica a {distancia}: {nombre} en {ubicacion}. {descripcion}",
                community_template: "Emergencia médica cerca ({distancia}): {nombre} en {ubicacion}.",
            },
            AlertKind::Violencia => Protocol {
                kind,
                circles: CircleSet { personal: true, police: true, community: true, ..Default::default() },
                min_tier: Tier::Grave,
                call_emergency_line: true,
                reescalation_timeout_min: 3,
                preventive_only: false,
                personal_template: "🆘 {nombre} reporta una situación de violencia en {ubicacion}. {descripcion}",
                institutional_template: "Violencia reportada a {distancia}: {nombre} en {ubicacion}. {descripcion}",
                community_template: "Situación de violencia a {distancia}: {nombre} necesita ayuda urgente.",
            },
            AlertKind::Incendio => Protocol {
                kind,
                circles: CircleSet { personal: true, fire: true, community: true, ..Default::default() },
                min_tier: Tier::Grave,
                call_emergency_line: true,
                reescalation_timeout_min: 3,
                preventive_only: false,
                personal_template: "🔥 {nombre} reporta un incendio en {ubicacion}.",
                institutional_template: "Incendio a {distancia}: {ubicacion}, reportado por {nombre}.",
                community_template: "Incendio cerca ({distancia}) en {ubicacion}. Evacúe la zona.",
            },
            AlertKind::Caida => Protocol {
                kind,
                circles: CircleSet { personal: true, ambulance: true, community: true, ..Default::default() },
                min_tier: Tier::Leve,
                call_emergency_line: false,
                reescalation_timeout_min: 10,
                preventive_only: false,
                personal_template: "⚠️ {nombre} sufrió una caída en {ubicacion}. {descripcion}",
                institutional_template: "Caída reportada a {distancia}: {nombre} en {ubicacion}.",
                community_template: "{nombre} sufrió una caída a {distancia} y puede necesitar ayuda.",
            },
            AlertKind::Emergencia => Protocol {
                kind,
                circles: CircleSet { personal: true, police: true, ambulance: true, fire: true, community: true },
                min_tier: Tier::Leve,
                call_emergency_line: false,
                reescalation_timeout_min: 5,
                preventive_only: false,
                personal_template: "🚨 {nombre} activó una alerta de emergencia en {ubicacion}. {descripcion}",
                institutional_template: "Emergencia a {distancia}: {nombre} en {ubicacion}. {descripcion}",
                community_template: "Emergencia a {distancia}: {nombre} necesita ayuda en {ubicacion}.",
            },
            AlertKind::Robo => Protocol {
                kind,
                circles: CircleSet { personal: true, police: true, community: true, ..Default::default() },
                min_tier: Tier::Grave,
                call_emergency_line: true,
                reescalation_timeout_min: 3,
                preventive_only: false,
                personal_template: "🚨 {nombre} reporta un robo en {ubicacion}. {descripcion}",
                institutional_template: "Robo en curso a {distancia}: {nombre} en {ubicacion}. {descripcion}",
                community_template: "Robo reportado a {distancia}: precaución en {ubicacion}.",
            },
            AlertKind::Sospecha => Protocol {
                kind,
                circles: CircleSet { community: true, ..Default::default() },
                min_tier: Tier::Leve,
                call_emergency_line: false,
                reescalation_timeout_min: 15,
                preventive_only: true,
                personal_template: "{nombre} reporta actividad sospechosa en {ubicacion}. {descripcion}",
                institutional_template: "Actividad sospechosa a {distancia}: {ubicacion}. {descripcion}",
                community_template: "👁️ Actividad sospechosa a {distancia}: {descripcion} ¿Puedes confirmarla?",
            },
            // Unrecognized classifications must still reach responders:
            // every circle participates and any institution type is
            // admitted. Severity alone decides activation.
            AlertKind::Otro => Protocol {
                kind,
                circles: CircleSet { personal: true, police: true, ambulance: true, fire: true, community: true },
                min_tier: Tier::Leve,
                call_emergency_line: false,
                reescalation_timeout_min: 10,
                preventive_only: false,
                personal_template: "🚨 {nombre} activó una alerta en {ubicacion}. {descripcion}",
                institutional_template: "Alerta a {distancia}: {nombre} en {ubicacion}. {descripcion}",
                community_template: "Alerta a {distancia}: {nombre} en {ubicacion}.",
            },
        }
    }

    /// Resolves a label plus runtime flags into an adjusted protocol.
    ///
    /// A weapon forces police and ambulance participation, raises the minimum
    /// tier to 3 and shortens the re-escalation timeout to 1 minute. Injuries
    /// force ambulance participation and raise the minimum tier to at least 2.
    pub fn resolve(label: &str, flags: RuntimeFlags) -> Protocol {
        let flags = flags.merge(RuntimeFlags::from_label(label));
        let mut protocol = Self::base(AlertKind::parse(label));

        if flags.weapon {
            protocol.circles.police = true;
            protocol.circles.ambulance = true;
            protocol.min_tier = Tier::Critica;
            protocol.reescalation_timeout_min = 1;
            protocol.call_emergency_line = true;
        }
        if flags.injuries {
            protocol.circles.ambulance = true;
            protocol.min_tier = protocol.min_tier.max(Tier::Grave);
        }
        protocol
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_known_labels() {
        assert_eq!(AlertKind::parse("seguridad"), AlertKind::Seguridad);
        assert_eq!(AlertKind::parse("SALUD "), AlertKind::Salud);
        assert_eq!(AlertKind::parse("caída"), AlertKind::Caida);
        assert_eq!(AlertKind::parse("robo"), AlertKind::Robo);
        assert_eq!(AlertKind::parse("robo_armado"), AlertKind::Robo);
    }

    #[test]
    fn test_parse_unknown_label_falls_back() {
        assert_eq!(AlertKind::parse("meteorito"), AlertKind::Otro);
        assert_eq!(AlertKind::parse(""), AlertKind::Otro);
    }

    #[test]
    fn test_default_protocol_for_unknown_label() {
        let p = ProtocolTable::resolve("meteorito", RuntimeFlags::default());
        assert_eq!(p.kind, AlertKind::Otro);
        assert!(p.circles.personal);
        assert_eq!(p.min_tier, Tier::Leve);
    }

    #[test]
    fn test_unknown_label_activates_all_geo_circles() {
        // Severity drives circle activation; an unrecognized label must
        // never silence institutions or the community network.
        let p = ProtocolTable::resolve("meteorito", RuntimeFlags::default());
        assert!(p.circles.police && p.circles.ambulance && p.circles.fire);
        assert!(p.circles.community);
        assert!(p.admits_institution("policia"));
        assert!(p.admits_institution("ambulancia"));
    }

    #[test]
    fn test_tier_capable_entries_reach_community() {
        assert!(ProtocolTable::resolve("seguridad", RuntimeFlags::default()).circles.community);
        assert!(ProtocolTable::resolve("salud", RuntimeFlags::default()).circles.community);
    }

    #[test]
    fn test_weapon_adjustment() {
        let p = ProtocolTable::resolve("robo_armado", RuntimeFlags::default());
        assert!(p.circles.police);
        assert!(p.circles.ambulance, "weapon forces ambulance participation");
        assert_eq!(p.min_tier, Tier::Critica);
        assert_eq!(p.reescalation_timeout_min, 1);
        assert!(p.call_emergency_line);
    }

    #[test]
    fn test_weapon_flag_from_classifier() {
        // Plain label, weapon reported by the classifier.
        let p = ProtocolTable::resolve("seguridad", RuntimeFlags { weapon: true, injuries: false });
        assert!(p.circles.police);
        assert_eq!(p.min_tier, Tier::Critica);
        assert_eq!(p.reescalation_timeout_min, 1);
    }

    #[test]
    fn test_injuries_adjustment() {
        let p = ProtocolTable::resolve("seguridad", RuntimeFlags { weapon: false, injuries: true });
        assert!(p.circles.ambulance);
        assert_eq!(p.min_tier, Tier::Grave);
    }

    #[test]
    fn test_injuries_never_lower_weapon_tier() {
        let p = ProtocolTable::resolve("robo_armado", RuntimeFlags { weapon: false, injuries: true });
        assert_eq!(p.min_tier, Tier::Critica);
    }

    #[test]
    fn test_fall_implies_injuries() {
        let flags = RuntimeFlags::from_label("caida");
        assert!(flags.injuries);
        let p = ProtocolTable::resolve("caida", RuntimeFlags::default());
        assert_eq!(p.min_tier, Tier::Grave);
        assert!(p.circles.ambulance);
    }

    #[test]
    fn test_robo_armado_admits_police_and_ambulance_only() {
        let p = ProtocolTable::resolve("robo_armado", RuntimeFlags::default());
        assert!(p.admits_institution("policia"));
        assert!(p.admits_institution("seguridad"));
        assert!(p.admits_institution("ambulancia"));
        assert!(p.admits_institution(""), "untyped institutions admitted");
        assert!(!p.admits_institution("bomberos"));
    }

    #[test]
    fn test_salud_admits_health_institutions() {
        let p = ProtocolTable::resolve("salud", RuntimeFlags::default());
        assert!(p.admits_institution("ambulancia"));
        assert!(p.admits_institution("salud"));
        assert!(p.admits_institution(""));
        assert!(!p.admits_institution("policia"));
    }

    #[test]
    fn test_emergencia_and_caida_admit_all() {
        for label in ["emergencia", "caida"] {
            let p = ProtocolTable::resolve(label, RuntimeFlags::default());
            for tipo in ["policia", "ambulancia", "bomberos", "seguridad", ""] {
                assert!(p.admits_institution(tipo), "{label} should admit {tipo:?}");
            }
        }
    }

    #[test]
    fn test_sospecha_is_preventive_only() {
        let p = ProtocolTable::resolve("sospecha", RuntimeFlags::default());
        assert!(p.preventive_only);
        assert!(p.circles.community);
        assert!(!p.circles.personal);
    }

    #[test]
    fn test_messages_render_independently() {
        let p = ProtocolTable::resolve("seguridad", RuntimeFlags::default());
        let ctx = MessageContext {
            nombre: "Ana".into(),
            ubicacion: Some("Calle 45".into()),
            distancia_km: Some(0.4),
            descripcion: Some("Hombre la sigue.".into()),
        };
        let msgs = p.render_messages(&ctx);
        assert!(msgs.personal.contains("Ana"));
        assert!(msgs.institutional.contains("0.40 km"));
        assert!(msgs.community.contains("0.40 km"));
        // Each circle gets its own string, not a shared mutated buffer.
        assert_ne!(msgs.personal, msgs.community);
        assert_ne!(msgs.personal, msgs.institutional);
    }

    #[test]
    fn test_render_with_missing_placeholders() {
        let p = ProtocolTable::resolve("otro", RuntimeFlags::default());
        let msgs = p.render_messages(&MessageContext {
            nombre: "Luis".into(),
            ..Default::default()
        });
        assert!(msgs.personal.contains("ubicación desconocida"));
        assert!(msgs.personal.contains("sin más detalles"));
    }
}
