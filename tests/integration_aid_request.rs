use std::collections::BTreeSet;

use chrono::NaiveDate;
use opendal::services::Memory;
use opendal::Operator;

use relieflink::aid::documents::{DocumentKind, DocumentStore};
use relieflink::aid::{
    AidRequestRegistry, AssistanceNeeds, DisasterDetails, DisasterType, DraftUpdate, LocationInfo,
    NeedTag, PersonalInfo, UrgencyLevel, WizardStep, SUBMISSION_CONFIRMATION,
};
use relieflink::error::AppError;

fn registry() -> AidRequestRegistry {
    let storage = Operator::new(Memory::default()).expect("memory operator").finish();
    AidRequestRegistry::new(DocumentStore::new(storage))
}

fn filled_sections() -> DraftUpdate {
    DraftUpdate {
        personal_info: Some(PersonalInfo {
            full_name: "Jonas Keller".to_string(),
            email: "jonas@example.com".to_string(),
            phone: "+41 79 000 00 00".to_string(),
            national_id: "CH-99120".to_string(),
            date_of_birth: NaiveDate::from_ymd_opt(1988, 3, 2),
        }),
        location: Some(LocationInfo {
            country: "Switzerland".to_string(),
            state: "Valais".to_string(),
            city: "Zermatt".to_string(),
            address: "Bergweg 4".to_string(),
            coordinates: Some("46.0207,7.7491".to_string()),
        }),
        disaster: Some(DisasterDetails {
            disaster_type: Some(DisasterType::Avalanche),
            date: NaiveDate::from_ymd_opt(2026, 1, 19),
            description: "Avalanche destroyed the chalet's east wing.".to_string(),
            severity: Some("high".to_string()),
            affected_people: Some(4),
        }),
        assistance: Some(AssistanceNeeds {
            immediate_needs: BTreeSet::from([NeedTag::EmergencyShelter, NeedTag::MedicalCare]),
            requested_amount: Some(12_000.0),
            urgency_level: Some(UrgencyLevel::Critical),
            additional_info: "Two family members need ongoing care.".to_string(),
        }),
    }
}

#[tokio::test]
async fn wizard_walk_with_gated_steps_and_submission() {
    let registry = registry();
    let draft = registry.create_draft().await;
    assert_eq!(draft.step, WizardStep::PersonalInfo);

    // An empty draft cannot advance past step 1.
    assert!(matches!(
        registry.advance(&draft.id).await,
        Err(AppError::Validation(_))
    ));

    registry.apply_update(&draft.id, filled_sections()).await.expect("fill");

    let mut current = registry.get(&draft.id).await.expect("draft");
    for expected in [
        WizardStep::Location,
        WizardStep::DisasterDetails,
        WizardStep::AssistanceNeeds,
        WizardStep::DocumentUpload,
    ] {
        current = registry.advance(&draft.id).await.expect("advance");
        assert_eq!(current.step, expected);
    }
    assert_eq!(current.step.number(), WizardStep::TOTAL);

    // Submission without documents is rejected; the draft stays put.
    let err = registry.submit(&draft.id).await.expect_err("no documents");
    assert!(err.to_string().contains("ID proof"));
    assert_eq!(
        registry.get(&draft.id).await.expect("draft").step,
        WizardStep::DocumentUpload
    );

    registry
        .attach(&draft.id, DocumentKind::IdProof, "passport.pdf", "application/pdf", vec![1, 2])
        .await
        .expect("id proof");
    registry
        .attach(&draft.id, DocumentKind::DamagePhotos, "east-wing.jpg", "image/jpeg", vec![3])
        .await
        .expect("photo one");
    registry
        .attach(&draft.id, DocumentKind::DamagePhotos, "roof.png", "image/png", vec![4])
        .await
        .expect("photo two");
    registry
        .attach(
            &draft.id,
            DocumentKind::OfficialReports,
            "municipal-report.pdf",
            "application/pdf",
            vec![5],
        )
        .await
        .expect("report");

    let ack = registry.submit(&draft.id).await.expect("accepted");
    assert!(ack.reference.starts_with("AID-"));
    assert_eq!(ack.message, SUBMISSION_CONFIRMATION);

    let submissions = registry.submissions().await;
    assert_eq!(submissions.len(), 1);
    let submission = &submissions[0];
    assert_eq!(submission.personal_info.full_name, "Jonas Keller");
    assert_eq!(submission.documents.damage_photos.len(), 2);
    assert_eq!(submission.documents.official_reports.len(), 1);
    assert!(submission.documents.id_proof.is_some());

    // The draft was reset for a fresh request.
    let reset = registry.get(&draft.id).await.expect("draft");
    assert_eq!(reset.step, WizardStep::PersonalInfo);
    assert!(reset.personal_info.full_name.is_empty());
}

#[tokio::test]
async fn partially_filled_steps_name_the_missing_fields() {
    let registry = registry();
    let draft = registry.create_draft().await;

    registry
        .apply_update(
            &draft.id,
            DraftUpdate {
                personal_info: Some(PersonalInfo {
                    full_name: "Jonas Keller".to_string(),
                    email: String::new(),
                    phone: "   ".to_string(),
                    national_id: "CH-99120".to_string(),
                    date_of_birth: None,
                }),
                ..Default::default()
            },
        )
        .await
        .expect("fill");

    let err = registry.advance(&draft.id).await.expect_err("gated");
    let message = err.to_string();
    assert!(message.contains("Email Address"));
    assert!(message.contains("Phone Number"));
    assert!(!message.contains("Full Name"));
}

#[tokio::test]
async fn rejected_files_are_discarded_with_a_message() {
    let registry = registry();
    let draft = registry.create_draft().await;

    let err = registry
        .attach(&draft.id, DocumentKind::IdProof, "selfie.mp4", "video/mp4", vec![1])
        .await
        .expect_err("rejected");
    assert_eq!(err.to_string(), "Please upload an image or PDF file for ID proof.");

    let err = registry
        .attach(&draft.id, DocumentKind::DamagePhotos, "report.pdf", "application/pdf", vec![1])
        .await
        .expect_err("rejected");
    assert_eq!(
        err.to_string(),
        "Please upload image files only for photos of affected areas."
    );

    let unchanged = registry.get(&draft.id).await.expect("draft");
    assert!(unchanged.documents.id_proof.is_none());
    assert!(unchanged.documents.damage_photos.is_empty());
}

#[tokio::test]
async fn unknown_drafts_are_not_found() {
    let registry = registry();
    assert!(matches!(
        registry.get("missing").await,
        Err(AppError::NotFound(_))
    ));
    assert!(matches!(
        registry.advance("missing").await,
        Err(AppError::NotFound(_))
    ));
}
