//! Seeded community data: the donor leaderboard and the impact dashboard
//! series. Everything here is in-memory mock data shaped for the
//! marketing-facing pages.

use chrono::NaiveDate;
use serde::Serialize;

use crate::error::AppError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum LeaderboardWindow {
    AllTime,
    ThisYear,
    ThisMonth,
    ThisWeek,
}

impl LeaderboardWindow {
    pub fn parse(raw: Option<&str>) -> Result<Self, AppError> {
        match raw {
            None | Some("all-time") => Ok(Self::AllTime),
            Some("this-year") => Ok(Self::ThisYear),
            Some("this-month") => Ok(Self::ThisMonth),
            Some("this-week") => Ok(Self::ThisWeek),
            Some(other) => Err(AppError::Validation(format!(
                "unknown leaderboard window: {other}"
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DonorRank {
    pub id: String,
    pub name: String,
    pub total_donated: f64,
    pub campaigns_supported: u32,
    pub avatar: String,
    pub join_date: NaiveDate,
    pub rank: u32,
    pub badge: String,
    pub is_anonymous: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct LeaderboardTotals {
    pub total_donations: f64,
    pub total_donors: usize,
    pub avg_donation: f64,
    pub total_campaigns: u32,
}

pub fn leaderboard_totals(donors: &[DonorRank]) -> LeaderboardTotals {
    let total_donations: f64 = donors.iter().map(|d| d.total_donated).sum();
    let total_donors = donors.len();
    LeaderboardTotals {
        total_donations,
        total_donors,
        avg_donation: if total_donors == 0 { 0.0 } else { total_donations / total_donors as f64 },
        total_campaigns: donors.iter().map(|d| d.campaigns_supported).sum(),
    }
}

pub fn seeded_donors() -> Vec<DonorRank> {
    fn donor(
        id: &str,
        name: &str,
        total_donated: f64,
        campaigns_supported: u32,
        avatar: &str,
        join_date: (i32, u32, u32),
        rank: u32,
        badge: &str,
        is_anonymous: bool,
    ) -> DonorRank {
        DonorRank {
            id: id.to_string(),
            name: name.to_string(),
            total_donated,
            campaigns_supported,
            avatar: format!(
                "https://images.pexels.com/photos/{avatar}?auto=compress&cs=tinysrgb&w=100&h=100&dpr=1"
            ),
            join_date: NaiveDate::from_ymd_opt(join_date.0, join_date.1, join_date.2)
                .expect("seeded join date"),
            rank,
            badge: badge.to_string(),
            is_anonymous,
        }
    }

    vec![
        donor("1", "Sarah Johnson", 15_750.0, 45, "774909/pexels-photo-774909.jpeg", (2023, 1, 15), 1, "Platinum Angel", false),
        donor("2", "Michael Chen", 12_400.0, 40, "220453/pexels-photo-220453.jpeg", (2023, 2, 8), 2, "Gold Guardian", false),
        donor("3", "Emily", 11_200.0, 31, "415829/pexels-photo-415829.jpeg", (2022, 11, 22), 3, "Silver Savior", false),
        donor("4", "Anonymous Donor", 9_800.0, 15, "1043471/pexels-photo-1043471.jpeg", (2023, 3, 10), 4, "Hope Bringer", true),
        donor("5", "David Thompson", 8_900.0, 22, "91227/pexels-photo-91227.jpeg", (2023, 1, 30), 5, "Compassion Hero", false),
        donor("6", "Lisa Wang", 7_650.0, 19, "712513/pexels-photo-712513.jpeg", (2022, 12, 5), 6, "Relief Champion", false),
        donor("7", "James Miller", 6_890.0, 16, "1222271/pexels-photo-1222271.jpeg", (2023, 4, 12), 7, "Community Builder", false),
        donor("8", "Maria Garcia", 6_200.0, 25, "733872/pexels-photo-733872.jpeg", (2022, 10, 18), 8, "Kindness Advocate", false),
        donor("9", "Robert Lee", 5_500.0, 12, "1043474/pexels-photo-1043474.jpeg", (2023, 5, 22), 9, "Hope Supporter", false),
        donor("10", "Anna Wilson", 4_950.0, 14, "762020/pexels-photo-762020.jpeg", (2023, 2, 28), 10, "Caring Heart", false),
    ]
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactOverview {
    pub lives_impacted: u64,
    pub countries_reached: u32,
    pub active_campaigns: u32,
    pub success_rate_pct: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyImpact {
    pub month: String,
    pub donations: f64,
    pub lives: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct DisasterShare {
    pub name: String,
    pub share_pct: u8,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegionImpact {
    pub region: String,
    pub campaigns: u32,
    pub funding: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ImpactReport {
    pub overview: ImpactOverview,
    pub monthly: Vec<MonthlyImpact>,
    pub disaster_types: Vec<DisasterShare>,
    pub regions: Vec<RegionImpact>,
}

pub fn impact_report() -> ImpactReport {
    fn monthly(month: &str, donations: f64, lives: u32) -> MonthlyImpact {
        MonthlyImpact { month: month.to_string(), donations, lives }
    }
    fn share(name: &str, share_pct: u8) -> DisasterShare {
        DisasterShare { name: name.to_string(), share_pct }
    }
    fn region(region: &str, campaigns: u32, funding: f64) -> RegionImpact {
        RegionImpact { region: region.to_string(), campaigns, funding }
    }

    ImpactReport {
        overview: ImpactOverview {
            lives_impacted: 45_237,
            countries_reached: 32,
            active_campaigns: 127,
            success_rate_pct: 98,
        },
        monthly: vec![
            monthly("Jan", 125_000.0, 3_200),
            monthly("Feb", 180_000.0, 4_100),
            monthly("Mar", 220_000.0, 5_300),
            monthly("Apr", 195_000.0, 4_800),
            monthly("May", 265_000.0, 6_200),
            monthly("Jun", 310_000.0, 7_100),
        ],
        disaster_types: vec![
            share("Hurricanes", 35),
            share("Earthquakes", 28),
            share("Floods", 20),
            share("Wildfires", 12),
            share("Droughts", 5),
        ],
        regions: vec![
            region("North America", 45, 850_000.0),
            region("Asia Pacific", 38, 720_000.0),
            region("Europe", 22, 480_000.0),
            region("South America", 15, 320_000.0),
            region("Africa", 12, 280_000.0),
            region("Middle East", 8, 150_000.0),
        ],
    }
}
