use domain::{
    DomainError, FacilityContext, InspectionImage, InspectionStatus, InstrumentParameter,
    InstrumentTemplate, InstrumentType, NotInspectedReason, ParameterId, PendingReading,
    ReadingBatch, ReadingValues,
};
use std::collections::BTreeMap;

fn piezometer() -> InstrumentTemplate {
    InstrumentTemplate {
        id: "tpl-1".to_string(),
        custom_name: "PZ-01".to_string(),
        instrument_type: InstrumentType {
            domain_id: "type-pz".to_string(),
            name: "Piezometer".to_string(),
            measurement_units: vec!["m".to_string()],
        },
        parameters: vec![
            InstrumentParameter {
                id: ParameterId::new("p-level"),
                name: "Level".to_string(),
                attention_value: "10".to_string(),
                alert_value: "12".to_string(),
            },
            InstrumentParameter {
                id: ParameterId::new("p-pressure"),
                name: "Pressure".to_string(),
                attention_value: "".to_string(),
                alert_value: "".to_string(),
            },
        ],
    }
}

#[test]
fn facility_context_builds() {
    let ctx = FacilityContext::new("Dam A", true);
    assert_eq!(ctx.facility_name, "Dam A");
    assert!(ctx.can_register_inspections);
    assert!(FacilityContext::default().facility_name.is_empty());
}

#[test]
fn reading_values_reject_undeclared_parameter() {
    let template = piezometer();
    let err = ReadingValues::for_template(
        &template,
        vec![(ParameterId::new("p-unknown"), "1".to_string())],
    )
    .expect_err("unknown parameter");
    assert_eq!(
        err,
        DomainError::UnknownParameter {
            template_id: "tpl-1".to_string(),
            parameter: "p-unknown".to_string(),
        }
    );
}

#[test]
fn reading_values_round_trip_through_parameter_names() {
    let template = piezometer();
    let values = ReadingValues::for_template(
        &template,
        vec![(ParameterId::new("p-level"), "11,50".to_string())],
    )
    .expect("values");
    let named = values.to_named(&template);
    assert_eq!(named.get("Level").map(String::as_str), Some("11,50"));

    let mut stored = named.clone();
    stored.insert("Removed".to_string(), "3".to_string());
    let restored = ReadingValues::from_named(&template, &stored);
    assert_eq!(restored.len(), 1);
    assert_eq!(restored.get(&ParameterId::new("p-level")), Some("11,50"));
}

#[test]
fn pending_reading_denormalizes_template() {
    let template = piezometer();
    let values = ReadingValues::for_template(
        &template,
        vec![(ParameterId::new("p-pressure"), "2".to_string())],
    )
    .expect("values");
    let reading = PendingReading::from_template(&template, &values, "", "2024-05-01");
    assert_eq!(reading.instrument_type_id, "type-pz");
    assert_eq!(reading.instrument_type_name, "Piezometer");
    assert_eq!(reading.custom_name, "PZ-01");
    assert!(!reading.is_empty());

    let blank = PendingReading {
        values: BTreeMap::from([("Level".to_string(), "  ".to_string())]),
        notes: " ".to_string(),
        ..reading
    };
    assert!(blank.is_empty());
}

#[test]
fn batch_groups_by_date() {
    let template = piezometer();
    let values = ReadingValues::default();
    let a = PendingReading::from_template(&template, &values, "a", "2024-05-02");
    let b = PendingReading::from_template(&template, &values, "b", "2024-05-01");
    let c = PendingReading::from_template(&template, &values, "c", "2024-05-02");
    let batch = ReadingBatch::new(vec![a, b, c]);
    let groups = batch.by_date();
    let dates: Vec<&str> = groups.keys().copied().collect();
    assert_eq!(dates, vec!["2024-05-01", "2024-05-02"]);
    assert_eq!(groups["2024-05-02"].len(), 2);
}

#[test]
fn inspection_reason_only_kept_when_not_inspected() {
    let mut image = InspectionImage::registered("file:///tmp/a.jpg", "Crack near spillway");
    assert_eq!(image.status, Some(InspectionStatus::New));
    assert!(image.date.is_none());

    image.set_status(
        InspectionStatus::Increased,
        Some(NotInspectedReason::HealthAndSafety),
        "2024-05-01",
    );
    assert!(image.not_inspected_reason.is_none());

    image.set_status(
        InspectionStatus::NotInspected,
        Some(NotInspectedReason::AccessImpossible),
        "2024-05-02",
    );
    assert_eq!(
        image.not_inspected_reason,
        Some(NotInspectedReason::AccessImpossible)
    );
    assert_eq!(image.date.as_deref(), Some("2024-05-02"));
}

#[test]
fn inspection_status_parses_display_and_wire_labels() {
    assert_eq!(
        InspectionStatus::parse("not-inspected"),
        Some(InspectionStatus::NotInspected)
    );
    assert_eq!(
        InspectionStatus::parse("Diminuiu"),
        Some(InspectionStatus::Decreased)
    );
    assert_eq!(InspectionStatus::parse("sideways"), None);
    assert_eq!(
        NotInspectedReason::parse("health & safety"),
        Some(NotInspectedReason::HealthAndSafety)
    );
}
