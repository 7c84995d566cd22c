use cardiorisk::domain::{
    ChestPainType, ModelPreset, PatientInput, RiskBand, RiskFactorModel, RiskScorer, Sex,
    Thalassemia, Weight, SCORE_CAP,
};
use proptest::prelude::*;

fn sex() -> impl Strategy<Value = Sex> {
    prop_oneof![Just(Sex::Male), Just(Sex::Female)]
}

fn chest_pain() -> impl Strategy<Value = ChestPainType> {
    prop_oneof![
        Just(ChestPainType::Typical),
        Just(ChestPainType::Atypical),
        Just(ChestPainType::NonAnginal),
        Just(ChestPainType::Asymptomatic),
    ]
}

fn thalassemia() -> impl Strategy<Value = Thalassemia> {
    prop_oneof![
        Just(Thalassemia::Normal),
        Just(Thalassemia::FixedDefect),
        Just(Thalassemia::ReversibleDefect),
    ]
}

fn any_preset() -> impl Strategy<Value = ModelPreset> {
    prop_oneof![Just(ModelPreset::Dashboard), Just(ModelPreset::HeartRateAdjusted)]
}

fn patient() -> impl Strategy<Value = PatientInput> {
    (
        20u8..=100,
        sex(),
        80u16..=200,
        100u16..=600,
        60u16..=220,
        chest_pain(),
        any::<bool>(),
        any::<bool>(),
        0.0f64..=6.0,
        0u8..=3,
        thalassemia(),
    )
        .prop_map(
            |(age, sex, bp, chol, hr, pain, sugar, angina, st, vessels, thal)| PatientInput {
                age,
                sex,
                resting_blood_pressure: bp,
                cholesterol: chol,
                max_heart_rate: hr,
                chest_pain_type: pain,
                fasting_blood_sugar_high: sugar,
                exercise_induced_angina: angina,
                st_depression: st,
                major_vessels: vessels,
                thalassemia: thal,
            },
        )
}

fn scorer(preset: ModelPreset) -> RiskScorer {
    RiskScorer::new(RiskFactorModel::preset(preset))
}

// ── Score stays within [0, 0.95] ──────────────────────────────────────────

proptest! {
    #[test]
    fn score_is_bounded(input in patient(), preset in any_preset()) {
        prop_assert!(input.validate().is_ok());
        let assessment = scorer(preset).evaluate(&input);
        prop_assert!(assessment.score >= 0.0);
        prop_assert!(assessment.score <= 0.95);
    }
}

// ── Raising age, blood pressure or cholesterol never lowers the score ────

proptest! {
    #[test]
    fn monotone_in_age(input in patient(), bump in 0u8..=80, preset in any_preset()) {
        let scorer = scorer(preset);
        let older = PatientInput { age: input.age.saturating_add(bump).min(100), ..input.clone() };
        prop_assert!(scorer.evaluate(&older).score >= scorer.evaluate(&input).score);
    }

    #[test]
    fn monotone_in_blood_pressure(input in patient(), bump in 0u16..=120, preset in any_preset()) {
        let scorer = scorer(preset);
        let higher = PatientInput {
            resting_blood_pressure: (input.resting_blood_pressure + bump).min(200),
            ..input.clone()
        };
        prop_assert!(scorer.evaluate(&higher).score >= scorer.evaluate(&input).score);
    }

    #[test]
    fn monotone_in_cholesterol(input in patient(), bump in 0u16..=500, preset in any_preset()) {
        let scorer = scorer(preset);
        let higher = PatientInput {
            cholesterol: (input.cholesterol + bump).min(600),
            ..input.clone()
        };
        prop_assert!(scorer.evaluate(&higher).score >= scorer.evaluate(&input).score);
    }
}

// ── Band follows the exclusive 0.3 / 0.7 thresholds ──────────────────────

proptest! {
    #[test]
    fn band_matches_thresholds(score in 0.0f64..=0.95) {
        let expected = if score > 0.7 {
            RiskBand::High
        } else if score > 0.3 {
            RiskBand::Moderate
        } else {
            RiskBand::Low
        };
        prop_assert_eq!(RiskBand::from_score(score), expected);
    }

    #[test]
    fn assessment_band_is_derived_from_score(input in patient(), preset in any_preset()) {
        let assessment = scorer(preset).evaluate(&input);
        prop_assert_eq!(assessment.band, RiskBand::from_score(assessment.score));
    }
}

// ── Evaluation is idempotent and the score is the capped contribution sum ─

proptest! {
    #[test]
    fn evaluate_is_idempotent(input in patient(), preset in any_preset()) {
        let scorer = scorer(preset);
        prop_assert_eq!(scorer.evaluate(&input), scorer.evaluate(&input));
    }

    #[test]
    fn score_is_capped_contribution_sum(input in patient(), preset in any_preset()) {
        let assessment = scorer(preset).evaluate(&input);
        let total = assessment.uncapped_total();
        let capped = Weight::from_bps(total.bps().min(SCORE_CAP.bps()));
        prop_assert_eq!(assessment.score, capped.as_f64());
    }

    #[test]
    fn contributions_follow_rule_order(input in patient(), preset in any_preset()) {
        let model = RiskFactorModel::preset(preset);
        let assessment = RiskScorer::new(model.clone()).evaluate(&input);

        let fired: Vec<_> = model
            .rules
            .iter()
            .filter(|r| r.applies(&input))
            .map(|r| (r.factor, r.weight))
            .collect();
        let reported: Vec<_> = assessment
            .contributions
            .iter()
            .map(|c| (c.factor, c.weight))
            .collect();
        prop_assert_eq!(fired, reported);
    }
}
