pub mod documents;

use std::collections::{BTreeSet, HashMap};

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::error::AppError;
use documents::{DocumentKind, DocumentStore, StoredDocument};

/// Confirmation copy returned after a successful submission.
pub const SUBMISSION_CONFIRMATION: &str =
    "Your request has been submitted. Our team will review it within 24 hours.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WizardStep {
    PersonalInfo,
    Location,
    DisasterDetails,
    AssistanceNeeds,
    DocumentUpload,
}

impl WizardStep {
    pub const TOTAL: u8 = 5;

    pub fn number(&self) -> u8 {
        match self {
            Self::PersonalInfo => 1,
            Self::Location => 2,
            Self::DisasterDetails => 3,
            Self::AssistanceNeeds => 4,
            Self::DocumentUpload => 5,
        }
    }

    fn next(&self) -> Option<Self> {
        match self {
            Self::PersonalInfo => Some(Self::Location),
            Self::Location => Some(Self::DisasterDetails),
            Self::DisasterDetails => Some(Self::AssistanceNeeds),
            Self::AssistanceNeeds => Some(Self::DocumentUpload),
            Self::DocumentUpload => None,
        }
    }

    fn previous(&self) -> Option<Self> {
        match self {
            Self::PersonalInfo => None,
            Self::Location => Some(Self::PersonalInfo),
            Self::DisasterDetails => Some(Self::Location),
            Self::AssistanceNeeds => Some(Self::DisasterDetails),
            Self::DocumentUpload => Some(Self::AssistanceNeeds),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DisasterType {
    HurricaneTyphoon,
    Earthquake,
    Flood,
    Wildfire,
    Tornado,
    Drought,
    Landslide,
    Tsunami,
    VolcanicEruption,
    Cyclone,
    BlizzardIceStorm,
    Hailstorm,
    Mudslide,
    Avalanche,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NeedTag {
    EmergencyShelter,
    FoodAndWater,
    MedicalCare,
    Clothing,
    Transportation,
    Communication,
    TemporaryHousing,
    UtilitiesRestoration,
    PetCare,
    PsychologicalSupport,
    LegalAid,
    FinancialAssistance,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UrgencyLevel {
    Critical,
    High,
    Medium,
    Low,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PersonalInfo {
    #[serde(default)]
    pub full_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub national_id: String,
    #[serde(default)]
    pub date_of_birth: Option<NaiveDate>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LocationInfo {
    #[serde(default)]
    pub country: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub coordinates: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DisasterDetails {
    #[serde(default)]
    pub disaster_type: Option<DisasterType>,
    #[serde(default)]
    pub date: Option<NaiveDate>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub severity: Option<String>,
    #[serde(default)]
    pub affected_people: Option<u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssistanceNeeds {
    #[serde(default)]
    pub immediate_needs: BTreeSet<NeedTag>,
    #[serde(default)]
    pub requested_amount: Option<f64>,
    #[serde(default)]
    pub urgency_level: Option<UrgencyLevel>,
    #[serde(default)]
    pub additional_info: String,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct DocumentSet {
    pub id_proof: Option<StoredDocument>,
    pub damage_photos: Vec<StoredDocument>,
    pub official_reports: Vec<StoredDocument>,
}

/// A draft aid request being worked through the wizard. Ephemeral: drafts
/// and submissions live in memory only.
#[derive(Debug, Clone, Serialize)]
pub struct AidRequestDraft {
    pub id: String,
    pub step: WizardStep,
    pub personal_info: PersonalInfo,
    pub location: LocationInfo,
    pub disaster: DisasterDetails,
    pub assistance: AssistanceNeeds,
    pub documents: DocumentSet,
    pub created_at: DateTime<Utc>,
}

impl AidRequestDraft {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            step: WizardStep::PersonalInfo,
            personal_info: PersonalInfo::default(),
            location: LocationInfo::default(),
            disaster: DisasterDetails::default(),
            assistance: AssistanceNeeds::default(),
            documents: DocumentSet::default(),
            created_at: Utc::now(),
        }
    }

    fn reset_keeping_id(&self) -> Self {
        Self {
            id: self.id.clone(),
            ..Self::new()
        }
    }

    /// Required-field check for one step: non-empty checks only, listing
    /// the missing field labels.
    fn validate_step(&self, step: WizardStep) -> Result<(), AppError> {
        let mut missing: Vec<&str> = Vec::new();
        match step {
            WizardStep::PersonalInfo => {
                if self.personal_info.full_name.trim().is_empty() {
                    missing.push("Full Name");
                }
                if self.personal_info.email.trim().is_empty() {
                    missing.push("Email Address");
                }
                if self.personal_info.phone.trim().is_empty() {
                    missing.push("Phone Number");
                }
                if self.personal_info.national_id.trim().is_empty() {
                    missing.push("National ID/Passport");
                }
            }
            WizardStep::Location => {
                if self.location.country.trim().is_empty() {
                    missing.push("Country");
                }
                if self.location.state.trim().is_empty() {
                    missing.push("State/Province");
                }
                if self.location.city.trim().is_empty() {
                    missing.push("City");
                }
                if self.location.address.trim().is_empty() {
                    missing.push("Full Address");
                }
            }
            WizardStep::DisasterDetails => {
                if self.disaster.disaster_type.is_none() {
                    missing.push("Type of Disaster");
                }
                if self.disaster.date.is_none() {
                    missing.push("Date of Disaster");
                }
                if self.disaster.description.trim().is_empty() {
                    missing.push("Disaster Description");
                }
            }
            WizardStep::AssistanceNeeds => {
                if self.assistance.immediate_needs.is_empty() {
                    missing.push("Immediate Needs");
                }
                if self.assistance.requested_amount.is_none() {
                    missing.push("Requested Amount");
                }
                if self.assistance.urgency_level.is_none() {
                    missing.push("Urgency Level");
                }
            }
            WizardStep::DocumentUpload => {
                // Documents are enforced at submission.
            }
        }

        if missing.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Section-granular update; provided sections replace the stored ones.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DraftUpdate {
    pub personal_info: Option<PersonalInfo>,
    pub location: Option<LocationInfo>,
    pub disaster: Option<DisasterDetails>,
    pub assistance: Option<AssistanceNeeds>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmissionAck {
    pub reference: String,
    pub message: String,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubmittedAidRequest {
    pub reference: String,
    pub submitted_at: DateTime<Utc>,
    pub personal_info: PersonalInfo,
    pub location: LocationInfo,
    pub disaster: DisasterDetails,
    pub assistance: AssistanceNeeds,
    pub documents: DocumentSet,
}

/// Holds all wizard drafts and accepted submissions, and owns the
/// document store for attachment blobs.
pub struct AidRequestRegistry {
    documents: DocumentStore,
    drafts: RwLock<HashMap<String, AidRequestDraft>>,
    submissions: RwLock<Vec<SubmittedAidRequest>>,
}

impl AidRequestRegistry {
    pub fn new(documents: DocumentStore) -> Self {
        Self {
            documents,
            drafts: RwLock::new(HashMap::new()),
            submissions: RwLock::new(Vec::new()),
        }
    }

    pub async fn create_draft(&self) -> AidRequestDraft {
        let draft = AidRequestDraft::new();
        self.drafts.write().await.insert(draft.id.clone(), draft.clone());
        draft
    }

    pub async fn get(&self, id: &str) -> Result<AidRequestDraft, AppError> {
        self.drafts
            .read()
            .await
            .get(id)
            .cloned()
            .ok_or(AppError::NotFound("aid request"))
    }

    pub async fn apply_update(&self, id: &str, update: DraftUpdate) -> Result<AidRequestDraft, AppError> {
        let mut drafts = self.drafts.write().await;
        let draft = drafts.get_mut(id).ok_or(AppError::NotFound("aid request"))?;
        if let Some(personal_info) = update.personal_info {
            draft.personal_info = personal_info;
        }
        if let Some(location) = update.location {
            draft.location = location;
        }
        if let Some(disaster) = update.disaster {
            draft.disaster = disaster;
        }
        if let Some(assistance) = update.assistance {
            draft.assistance = assistance;
        }
        Ok(draft.clone())
    }

    /// Advances to the next step, gated on the current step's required
    /// fields. A rejected advance leaves the draft untouched.
    pub async fn advance(&self, id: &str) -> Result<AidRequestDraft, AppError> {
        let mut drafts = self.drafts.write().await;
        let draft = drafts.get_mut(id).ok_or(AppError::NotFound("aid request"))?;
        draft.validate_step(draft.step)?;
        let next = draft
            .step
            .next()
            .ok_or(AppError::Validation("already at the final step".to_string()))?;
        draft.step = next;
        Ok(draft.clone())
    }

    pub async fn retreat(&self, id: &str) -> Result<AidRequestDraft, AppError> {
        let mut drafts = self.drafts.write().await;
        let draft = drafts.get_mut(id).ok_or(AppError::NotFound("aid request"))?;
        if let Some(previous) = draft.step.previous() {
            draft.step = previous;
        }
        Ok(draft.clone())
    }

    /// Stores an accepted attachment and tracks it on the draft. ID proof
    /// replaces any previous upload; photos and reports append.
    pub async fn attach(
        &self,
        id: &str,
        kind: DocumentKind,
        file_name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<StoredDocument, AppError> {
        // Reject before storing so a refused file leaves no trace.
        self.get(id).await?;
        let stored = self.documents.put(id, kind, file_name, content_type, bytes).await?;

        let mut drafts = self.drafts.write().await;
        let draft = drafts.get_mut(id).ok_or(AppError::NotFound("aid request"))?;
        match kind {
            DocumentKind::IdProof => {
                if let Some(previous) = draft.documents.id_proof.replace(stored.clone()) {
                    self.documents.discard(&previous).await;
                }
            }
            DocumentKind::DamagePhotos => draft.documents.damage_photos.push(stored.clone()),
            DocumentKind::OfficialReports => draft.documents.official_reports.push(stored.clone()),
        }
        Ok(stored)
    }

    pub async fn remove_document(
        &self,
        id: &str,
        kind: DocumentKind,
        index: usize,
    ) -> Result<AidRequestDraft, AppError> {
        let removed = {
            let mut drafts = self.drafts.write().await;
            let draft = drafts.get_mut(id).ok_or(AppError::NotFound("aid request"))?;
            match kind {
                DocumentKind::IdProof => draft.documents.id_proof.take(),
                DocumentKind::DamagePhotos => {
                    (index < draft.documents.damage_photos.len())
                        .then(|| draft.documents.damage_photos.remove(index))
                }
                DocumentKind::OfficialReports => {
                    (index < draft.documents.official_reports.len())
                        .then(|| draft.documents.official_reports.remove(index))
                }
            }
        };

        let removed = removed.ok_or(AppError::NotFound("document"))?;
        self.documents.discard(&removed).await;
        self.get(id).await
    }

    /// Final submission. Validates the required documents (and re-checks
    /// the earlier steps); on success the request is archived and the
    /// draft is reset to a fresh step-1 state.
    pub async fn submit(&self, id: &str) -> Result<SubmissionAck, AppError> {
        let mut drafts = self.drafts.write().await;
        let draft = drafts.get_mut(id).ok_or(AppError::NotFound("aid request"))?;

        for step in [
            WizardStep::PersonalInfo,
            WizardStep::Location,
            WizardStep::DisasterDetails,
            WizardStep::AssistanceNeeds,
        ] {
            draft.validate_step(step)?;
        }
        if draft.documents.id_proof.is_none() {
            return Err(AppError::Validation(
                "Please upload your ID proof before submitting.".to_string(),
            ));
        }
        if draft.documents.damage_photos.is_empty() {
            return Err(AppError::Validation(
                "Please upload at least one photo of affected areas before submitting.".to_string(),
            ));
        }

        let submitted_at = Utc::now();
        let reference = format!(
            "AID-{}",
            Uuid::new_v4().simple().to_string()[..8].to_uppercase()
        );
        let submission = SubmittedAidRequest {
            reference: reference.clone(),
            submitted_at,
            personal_info: draft.personal_info.clone(),
            location: draft.location.clone(),
            disaster: draft.disaster.clone(),
            assistance: draft.assistance.clone(),
            documents: std::mem::take(&mut draft.documents),
        };
        *draft = draft.reset_keeping_id();
        drop(drafts);

        tracing::info!(%reference, "aid request submitted for review");
        self.submissions.write().await.push(submission);

        Ok(SubmissionAck {
            reference,
            message: SUBMISSION_CONFIRMATION.to_string(),
            submitted_at,
        })
    }

    pub async fn submissions(&self) -> Vec<SubmittedAidRequest> {
        self.submissions.read().await.clone()
    }
}
