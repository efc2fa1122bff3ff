//! Resolved recipients of an alert, partitioned into circles.

use serde::Serialize;

/// Named partition of recipients for a single alert.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Circle {
    /// Trusted contacts and authorized caregivers.
    Personal,
    /// Institutional responders (police, ambulance, fire).
    Institucional,
    /// Community bystanders within the activation radius.
    Comunitario,
}

impl Circle {
    pub fn as_str(self) -> &'static str {
        match self {
            Circle::Personal => "cuidador",
            Circle::Institucional => "institucional",
            Circle::Comunitario => "comunitario",
        }
    }
}

/// A single delivery target produced by the recipient resolver.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipient {
    pub celular: String,
    pub nombre: String,
    pub circle: Circle,
    pub id_persona: Option<i32>,
    /// Institution label, for institutional recipients.
    pub entidad: Option<String>,
    /// Distance from the alert origin, for geo-resolved circles.
    pub distancia_km: Option<f64>,
}

/// The three deduplicated recipient lists for one alert.
#[derive(Debug, Clone, Default)]
pub struct ResolvedRecipients {
    pub personal: Vec<Recipient>,
    pub institutional: Vec<Recipient>,
    pub community: Vec<Recipient>,
}

impl ResolvedRecipients {
    pub fn total(&self) -> usize {
        self.personal.len() + self.institutional.len() + self.community.len()
    }

    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }

    /// Flattens the circles into dispatch order: personal first, then
    /// institutional, then community.
    pub fn into_dispatch_order(self) -> Vec<Recipient> {
        let mut all = self.personal;
        all.extend(self.institutional);
        all.extend(self.community);
        all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recipient(celular: &str, circle: Circle) -> Recipient {
        Recipient {
            celular: celular.into(),
            nombre: "X".into(),
            circle,
            id_persona: None,
            entidad: None,
            distancia_km: None,
        }
    }

    #[test]
    fn test_circle_db_labels() {
        assert_eq!(Circle::Personal.as_str(), "cuidador");
        assert_eq!(Circle::Institucional.as_str(), "institucional");
        assert_eq!(Circle::Comunitario.as_str(), "comunitario");
    }

    #[test]
    fn test_total_counts_all_circles() {
        let resolved = ResolvedRecipients {
            personal: vec![recipient("1111111", Circle::Personal)],
            institutional: vec![
                recipient("2222222", Circle::Institucional),
                recipient("3333333", Circle::Institucional),
            ],
            community: vec![],
        };
        assert_eq!(resolved.total(), 3);
        assert!(!resolved.is_empty());
    }

    #[test]
    fn test_dispatch_order_personal_first() {
        let resolved = ResolvedRecipients {
            personal: vec![recipient("1111111", Circle::Personal)],
            institutional: vec![recipient("2222222", Circle::Institucional)],
            community: vec![recipient("3333333", Circle::Comunitario)],
        };
        let order = resolved.into_dispatch_order();
        assert_eq!(
            order.iter().map(|r| r.circle).collect::<Vec<_>>(),
            vec![Circle::Personal, Circle::Institucional, Circle::Comunitario]
        );
    }
}
