use credit_explainer::scoring::{
    self, ApplicantPreset, ApplicantRecord, Decision, Factor, ScoringModel, APPROVAL_THRESHOLD,
    MAX_SCORE, MIN_SCORE,
};

fn with_utilization(base: ApplicantRecord, credit_utilization: f64) -> ApplicantRecord {
    ApplicantRecord {
        credit_utilization,
        ..base
    }
}

#[test]
fn presets_score_within_range_under_both_models() {
    for preset in ApplicantPreset::ALL {
        for model in ScoringModel::ALL {
            let result = scoring::score(&preset.record(), model);

            assert!(
                (MIN_SCORE..=MAX_SCORE).contains(&result.score),
                "{preset} under {model} scored {}",
                result.score
            );
            assert_eq!(
                result.decision == Decision::Approved,
                result.score >= APPROVAL_THRESHOLD,
                "{preset} under {model} decision disagrees with threshold"
            );
            assert_eq!(result.model_type, model);
        }
    }
}

#[test]
fn good_applicant_is_approved_and_risky_is_floored() {
    let good = scoring::score(&ApplicantPreset::Good.record(), ScoringModel::Standard);
    assert_eq!(good.score, 758);
    assert!(good.is_approved());

    for model in ScoringModel::ALL {
        let risky = scoring::score(&ApplicantPreset::Risky.record(), model);
        assert_eq!(risky.score, MIN_SCORE);
        assert_eq!(risky.decision, Decision::Denied);
    }

    let borderline = scoring::score(&ApplicantPreset::Borderline.record(), ScoringModel::Standard);
    assert_eq!(borderline.decision, Decision::Denied);
}

#[test]
fn higher_utilization_never_raises_the_score() {
    for model in ScoringModel::ALL {
        let base = ApplicantRecord::default();
        let mut previous = scoring::score(&with_utilization(base, 0.0), model).score;

        for step in 1..=20 {
            let utilization = f64::from(step) * 5.0;
            let current = scoring::score(&with_utilization(base, utilization), model).score;
            assert!(
                current <= previous,
                "{model}: utilization {utilization} raised score {previous} -> {current}"
            );
            previous = current;
        }
    }
}

#[test]
fn result_serializes_with_camel_case_wire_names() {
    let result = scoring::score(&ApplicantRecord::default(), ScoringModel::DeepLearning);
    let payload = serde_json::to_value(result).expect("result serializes");

    assert_eq!(payload["modelType"], "deepLearning");
    let importance = payload["featureImportance"]
        .as_object()
        .expect("importance object");
    assert_eq!(importance.len(), 6);
    for factor in Factor::ALL {
        let entry = &importance[factor.key()];
        assert!(entry["impact"].is_number(), "{factor} missing impact");
        assert!(entry["importance"].as_f64().expect("importance") >= 0.0);
    }
}

#[test]
fn scoring_is_deterministic() {
    let record = ApplicantPreset::Borderline.record();
    for model in ScoringModel::ALL {
        assert_eq!(scoring::score(&record, model), model.score(&record));
    }
}
