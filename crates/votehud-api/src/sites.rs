//! Human-readable names for vote sites

use std::collections::HashMap;

use crate::SiteId;

/// Maps site ids to display labels
#[derive(Debug, Clone)]
pub struct SiteCatalog {
    labels: HashMap<SiteId, String>,
}

impl SiteCatalog {
    /// Catalog with no known sites; every label falls back to `Site #<id>`
    pub fn empty() -> Self {
        Self {
            labels: HashMap::new(),
        }
    }

    /// Add or replace a label
    pub fn with_label(mut self, site: impl Into<SiteId>, label: impl Into<String>) -> Self {
        self.labels.insert(site.into(), label.into());
        self
    }

    /// Display label for a site
    pub fn label(&self, site: &SiteId) -> String {
        self.labels
            .get(site)
            .cloned()
            .unwrap_or_else(|| format!("Site #{}", site))
    }
}

impl Default for SiteCatalog {
    fn default() -> Self {
        Self::empty()
            .with_label("2", "Top Serveurs")
            .with_label("4", "Serveurs Minecraft")
            .with_label("5", "Serveur-Privé")
            .with_label("6", "Serveur-Minecraft-Vote")
            .with_label("7", "Serveur-Minecraft.com")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_sites_have_names() {
        let catalog = SiteCatalog::default();
        assert_eq!(catalog.label(&SiteId::new("2")), "Top Serveurs");
        assert_eq!(catalog.label(&SiteId::new("7")), "Serveur-Minecraft.com");
    }

    #[test]
    fn unknown_sites_fall_back_to_id() {
        let catalog = SiteCatalog::default();
        assert_eq!(catalog.label(&SiteId::new("42")), "Site #42");
    }

    #[test]
    fn labels_can_be_overridden() {
        let catalog = SiteCatalog::default().with_label("2", "TS");
        assert_eq!(catalog.label(&SiteId::new("2")), "TS");
    }
}
