use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DisasterCategory {
    Hurricane,
    Earthquake,
    Wildfire,
    Flood,
    Tornado,
    Drought,
    Cyclone,
    Volcano,
    Landslide,
    Blizzard,
    Tsunami,
    Hailstorm,
    Icestorm,
    Mudslide,
    Avalanche,
}

impl DisasterCategory {
    /// Parses a catalog filter. `all` (or nothing) means no filter.
    pub fn parse_filter(raw: Option<&str>) -> Result<Option<Self>, AppError> {
        let Some(raw) = raw else { return Ok(None) };
        let category = match raw {
            "all" => return Ok(None),
            "hurricane" => Self::Hurricane,
            "earthquake" => Self::Earthquake,
            "wildfire" => Self::Wildfire,
            "flood" => Self::Flood,
            "tornado" => Self::Tornado,
            "drought" => Self::Drought,
            "cyclone" => Self::Cyclone,
            "volcano" => Self::Volcano,
            "landslide" => Self::Landslide,
            "blizzard" => Self::Blizzard,
            "tsunami" => Self::Tsunami,
            "hailstorm" => Self::Hailstorm,
            "icestorm" => Self::Icestorm,
            "mudslide" => Self::Mudslide,
            "avalanche" => Self::Avalanche,
            other => {
                return Err(AppError::Validation(format!("unknown campaign category: {other}")))
            }
        };
        Ok(Some(category))
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Hurricane => "Hurricanes",
            Self::Earthquake => "Earthquakes",
            Self::Wildfire => "Wildfires",
            Self::Flood => "Floods",
            Self::Tornado => "Tornadoes",
            Self::Drought => "Droughts",
            Self::Cyclone => "Cyclones",
            Self::Volcano => "Volcanic Eruptions",
            Self::Landslide => "Landslides",
            Self::Blizzard => "Blizzards",
            Self::Tsunami => "Tsunamis",
            Self::Hailstorm => "Hailstorms",
            Self::Icestorm => "Ice Storms",
            Self::Mudslide => "Mudslides",
            Self::Avalanche => "Avalanches",
        }
    }
}

/// A disaster-relief fundraising target.
#[derive(Debug, Clone, Serialize)]
pub struct Campaign {
    pub id: String,
    pub title: String,
    pub description: String,
    pub location: String,
    pub target: f64,
    pub raised: f64,
    pub donors: u32,
    pub days_left: u32,
    pub image: String,
    pub category: DisasterCategory,
    pub verified: bool,
}

impl Campaign {
    /// Funding progress in percent, capped at 100.
    pub fn progress_pct(&self) -> f64 {
        if self.target <= 0.0 {
            return 0.0;
        }
        ((self.raised / self.target) * 100.0).min(100.0)
    }
}

/// The seeded campaign catalog. All data is in-memory mock data.
pub struct CampaignCatalog {
    campaigns: Vec<Campaign>,
}

impl Default for CampaignCatalog {
    fn default() -> Self {
        Self::seeded()
    }
}

impl CampaignCatalog {
    pub fn seeded() -> Self {
        Self { campaigns: seed_campaigns() }
    }

    pub fn all(&self) -> &[Campaign] {
        &self.campaigns
    }

    pub fn get(&self, id: &str) -> Option<&Campaign> {
        self.campaigns.iter().find(|campaign| campaign.id == id)
    }

    /// Case-insensitive title/location search combined with an optional
    /// category filter.
    pub fn search(&self, category: Option<DisasterCategory>, query: Option<&str>) -> Vec<&Campaign> {
        let needle = query.map(str::to_lowercase).unwrap_or_default();
        self.campaigns
            .iter()
            .filter(|campaign| {
                let matches_search = needle.is_empty()
                    || campaign.title.to_lowercase().contains(&needle)
                    || campaign.location.to_lowercase().contains(&needle);
                let matches_category = category.is_none_or(|wanted| campaign.category == wanted);
                matches_search && matches_category
            })
            .collect()
    }
}

fn seed_campaigns() -> Vec<Campaign> {
    fn campaign(
        id: &str,
        title: &str,
        description: &str,
        location: &str,
        target: f64,
        raised: f64,
        donors: u32,
        days_left: u32,
        image: &str,
        category: DisasterCategory,
    ) -> Campaign {
        Campaign {
            id: id.to_string(),
            title: title.to_string(),
            description: description.to_string(),
            location: location.to_string(),
            target,
            raised,
            donors,
            days_left,
            image: image.to_string(),
            category,
            verified: true,
        }
    }

    vec![
        campaign(
            "1",
            "Hurricane Relief - Florida Coast",
            "Emergency relief for families affected by Hurricane Maria. Providing shelter, food, and medical assistance to over 500 displaced families.",
            "Florida, USA",
            150_000.0,
            98_750.0,
            245,
            12,
            "https://images.pexels.com/photos/1108572/pexels-photo-1108572.jpeg?auto=compress&cs=tinysrgb&w=800",
            DisasterCategory::Hurricane,
        ),
        campaign(
            "3",
            "Wildfire Emergency Support",
            "Immediate assistance for wildfire evacuees. Providing emergency supplies, temporary accommodation, and livestock care.",
            "California, USA",
            80_000.0,
            67_200.0,
            178,
            15,
            "https://images.pexels.com/photos/1112048/pexels-photo-1112048.jpeg?auto=compress&cs=tinysrgb&w=800",
            DisasterCategory::Wildfire,
        ),
        campaign(
            "4",
            "Flood Relief - Bangladesh",
            "Monsoon flood relief operations. Distribution of food packages, clean water, and medical supplies to affected rural communities.",
            "Sylhet, Bangladesh",
            120_000.0,
            45_600.0,
            156,
            22,
            "https://images.pexels.com/photos/1367192/pexels-photo-1367192.jpeg?auto=compress&cs=tinysrgb&w=800",
            DisasterCategory::Flood,
        ),
        campaign(
            "5",
            "Tornado Recovery - Midwest",
            "Community rebuilding after devastating tornado. Focus on rebuilding schools, homes, and local businesses.",
            "Oklahoma, USA",
            95_000.0,
            78_400.0,
            203,
            18,
            "https://images.pexels.com/photos/1446076/pexels-photo-1446076.jpeg?auto=compress&cs=tinysrgb&w=800",
            DisasterCategory::Tornado,
        ),
        campaign(
            "6",
            "Drought Emergency Relief",
            "Critical water and food aid for drought-affected farming communities. Supporting both families and livestock.",
            "Kenya",
            180_000.0,
            112_300.0,
            267,
            25,
            "https://images.pexels.com/photos/6168061/pexels-photo-6168061.jpeg?auto=compress&cs=tinysrgb&w=800",
            DisasterCategory::Drought,
        ),
        campaign(
            "7",
            "Cyclone Aftermath - Philippines",
            "Emergency response for Typhoon Mawar survivors. Providing medical aid, clean water, and temporary shelter for displaced families.",
            "Luzon, Philippines",
            140_000.0,
            89_200.0,
            312,
            14,
            "https://images.pexels.com/photos/1118873/pexels-photo-1118873.jpeg?auto=compress&cs=tinysrgb&w=800",
            DisasterCategory::Cyclone,
        ),
        campaign(
            "8",
            "Volcanic Eruption Relief - Indonesia",
            "Supporting communities affected by Mount Merapi eruption. Emergency evacuation, medical care, and ash cleanup operations.",
            "Central Java, Indonesia",
            110_000.0,
            73_500.0,
            198,
            20,
            "https://images.pexels.com/photos/4666748/pexels-photo-4666748.jpeg?auto=compress&cs=tinysrgb&w=800",
            DisasterCategory::Volcano,
        ),
        campaign(
            "9",
            "Landslide Recovery - Nepal",
            "Rescue and relief operations for landslide victims. Providing emergency shelter, food supplies, and medical assistance.",
            "Sindhupalchok, Nepal",
            85_000.0,
            52_300.0,
            167,
            28,
            "https://images.pexels.com/photos/2166711/pexels-photo-2166711.jpeg?auto=compress&cs=tinysrgb&w=800",
            DisasterCategory::Landslide,
        ),
        campaign(
            "10",
            "Blizzard Emergency - Canada",
            "Winter storm relief for isolated communities. Providing heating supplies, food, and emergency transportation.",
            "Manitoba, Canada",
            75_000.0,
            41_800.0,
            134,
            16,
            "https://images.pexels.com/photos/1670187/pexels-photo-1670187.jpeg?auto=compress&cs=tinysrgb&w=800",
            DisasterCategory::Blizzard,
        ),
        campaign(
            "11",
            "Tsunami Recovery - Japan",
            "Long-term recovery support for tsunami-affected coastal communities. Infrastructure rebuilding and livelihood restoration.",
            "Fukushima, Japan",
            250_000.0,
            187_600.0,
            456,
            35,
            "https://images.pexels.com/photos/1108099/pexels-photo-1108099.jpeg?auto=compress&cs=tinysrgb&w=800",
            DisasterCategory::Tsunami,
        ),
        campaign(
            "12",
            "Hailstorm Damage Relief - Argentina",
            "Agricultural recovery after severe hailstorm. Supporting farmers with crop replanting and equipment replacement.",
            "Mendoza, Argentina",
            65_000.0,
            38_900.0,
            89,
            24,
            "https://images.pexels.com/photos/1118873/pexels-photo-1118873.jpeg?auto=compress&cs=tinysrgb&w=800",
            DisasterCategory::Hailstorm,
        ),
        campaign(
            "13",
            "Ice Storm Emergency - Eastern Europe",
            "Power restoration and emergency heating for ice storm victims. Critical infrastructure repair and community support.",
            "Ukraine",
            130_000.0,
            95_400.0,
            278,
            11,
            "https://images.pexels.com/photos/1670187/pexels-photo-1670187.jpeg?auto=compress&cs=tinysrgb&w=800",
            DisasterCategory::Icestorm,
        ),
        campaign(
            "14",
            "Mudslide Recovery - Colombia",
            "Emergency response for mudslide disaster. Search and rescue operations, medical aid, and temporary housing.",
            "Mocoa, Colombia",
            105_000.0,
            67_800.0,
            201,
            19,
            "https://images.pexels.com/photos/2166711/pexels-photo-2166711.jpeg?auto=compress&cs=tinysrgb&w=800",
            DisasterCategory::Mudslide,
        ),
        campaign(
            "15",
            "Avalanche Relief - Switzerland",
            "Mountain rescue and recovery operations. Supporting affected ski resort communities and emergency responders.",
            "Valais, Switzerland",
            90_000.0,
            54_200.0,
            145,
            21,
            "https://images.pexels.com/photos/1670187/pexels-photo-1670187.jpeg?auto=compress&cs=tinysrgb&w=800",
            DisasterCategory::Avalanche,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_filter_returns_only_matches() {
        let catalog = CampaignCatalog::seeded();
        let floods = catalog.search(Some(DisasterCategory::Flood), None);
        assert!(!floods.is_empty());
        assert!(floods.iter().all(|c| c.category == DisasterCategory::Flood));
    }

    #[test]
    fn search_matches_title_and_location() {
        let catalog = CampaignCatalog::seeded();
        let by_title = catalog.search(None, Some("tsunami"));
        assert!(by_title.iter().any(|c| c.id == "11"));

        let by_location = catalog.search(None, Some("kenya"));
        assert_eq!(by_location.len(), 1);
        assert_eq!(by_location[0].id, "6");
    }

    #[test]
    fn filter_parsing() {
        assert_eq!(DisasterCategory::parse_filter(None).unwrap(), None);
        assert_eq!(DisasterCategory::parse_filter(Some("all")).unwrap(), None);
        assert_eq!(
            DisasterCategory::parse_filter(Some("hurricane")).unwrap(),
            Some(DisasterCategory::Hurricane)
        );
        assert!(DisasterCategory::parse_filter(Some("asteroid")).is_err());
    }

    #[test]
    fn progress_is_capped() {
        let catalog = CampaignCatalog::seeded();
        let campaign = catalog.get("1").expect("seeded campaign");
        assert!(campaign.progress_pct() > 65.0 && campaign.progress_pct() < 66.0);

        let overfunded = Campaign {
            raised: 200_000.0,
            ..campaign.clone()
        };
        assert_eq!(overfunded.progress_pct(), 100.0);
    }
}
