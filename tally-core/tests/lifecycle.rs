//! End-to-end tests for the question lifecycle
//!
//! These tests drive the editor, submission manager and results service
//! together over the in-memory stores:
//! - A question is configured, answered, submitted and aggregated
//! - Structural edits keep submitted data consistent

use std::sync::Arc;

use tally_core::kinds::{
    ContributionAnswer, ContributionDetails, McqDetails, McqSettings, NumericalScaleDetails,
    NumericalScaleSettings,
};
use tally_core::storage::{MemoryQuestionStore, MemoryResponseStore, ResponseStore, StaticRoster};
use tally_core::summary::{ChoiceSummary, Summary};
use tally_core::{
    EngineConfig, Error, FeedbackSession, QuestionEditor, QuestionSettings, QuestionType, RecipientId,
    RespondentId, ResponseDetails, ResultsService, SubmissionManager, SubmissionState, TemplateCatalog,
    TemplateId,
};

struct Engine {
    editor: QuestionEditor,
    submissions: SubmissionManager,
    results: ResultsService,
    responses: Arc<MemoryResponseStore>,
    session: FeedbackSession,
}

async fn engine() -> Engine {
    let questions = Arc::new(MemoryQuestionStore::new());
    let responses = Arc::new(MemoryResponseStore::new());
    let roster = Arc::new(
        StaticRoster::new()
            .with_team("Team A", ["alice", "bob", "carol"])
            .with_team("Team B", ["dave"]),
    );
    let editor = QuestionEditor::new(
        questions.clone(),
        responses.clone(),
        TemplateCatalog::builtin().unwrap().shared(),
        EngineConfig::default(),
    );
    let session = editor.create_session("Sprint 4 retro").await.unwrap();
    Engine {
        editor,
        submissions: SubmissionManager::new(questions.clone(), responses.clone(), roster.clone()),
        results: ResultsService::new(questions, responses.clone(), roster),
        responses,
        session,
    }
}

fn abc() -> QuestionSettings {
    QuestionSettings::Mcq(McqSettings {
        options: vec!["A".into(), "B".into(), "C".into()],
        allow_other: false,
        weights: None,
    })
}

fn pick(s: &str) -> ResponseDetails {
    ResponseDetails::Mcq(McqDetails { selected: s.into() })
}

fn scale(v: f64) -> ResponseDetails {
    ResponseDetails::NumericalScale(NumericalScaleDetails { answer: v })
}

fn choice(summary: &Summary) -> &ChoiceSummary {
    match summary {
        Summary::Choice(s) => s,
        other => panic!("expected choice summary, got {other:?}"),
    }
}

#[tokio::test]
async fn mcq_answers_are_validated_and_counted() {
    let e = engine().await;
    let sid = e.session.id;
    let q = e.editor.add_question(sid, QuestionType::Mcq, None).await.unwrap();
    e.editor.update_question_settings(sid, q.id, abc()).await.unwrap();

    let alice = RespondentId::new("alice");
    let bob = RespondentId::new("bob");
    e.submissions.update_answer(sid, &alice, q.id, None, pick("B")).await.unwrap();
    e.submissions.submit(sid, &alice).await.unwrap();

    let err = e
        .submissions
        .update_answer(sid, &bob, q.id, None, pick("D"))
        .await
        .unwrap_err();
    assert!(err.violations().unwrap().mentions("selected"));
    assert!(e.submissions.submit(sid, &bob).await.is_err());

    let results = e.results.session_results(sid).await.unwrap();
    let summary = choice(&results[0].summary);
    assert_eq!(summary.response_count, 1);
    let counts: Vec<(String, usize)> = summary.options.iter().map(|o| (o.option.clone(), o.count)).collect();
    assert_eq!(
        counts,
        vec![("A".to_string(), 0), ("B".to_string(), 1), ("C".to_string(), 0)]
    );
    let b = &summary.options[1];
    assert_eq!(b.percentage, 100.0);
}

#[tokio::test]
async fn numerical_scale_reports_mean_and_median() {
    let e = engine().await;
    let sid = e.session.id;
    let q = e.editor.add_question(sid, QuestionType::NumericalScale, None).await.unwrap();
    e.editor
        .update_question_settings(
            sid,
            q.id,
            QuestionSettings::NumericalScale(NumericalScaleSettings {
                min: 1.0,
                max: 10.0,
                step: 0.5,
            }),
        )
        .await
        .unwrap();

    for (who, value) in [("alice", 3.0), ("bob", 3.5), ("carol", 6.0)] {
        let respondent = RespondentId::new(who);
        e.submissions.update_answer(sid, &respondent, q.id, None, scale(value)).await.unwrap();
        e.submissions.submit(sid, &respondent).await.unwrap();
    }

    let result = e.results.question_results(sid, q.id).await.unwrap();
    let Summary::Scale(summary) = result.summary else {
        panic!("expected scale summary");
    };
    assert!((summary.mean.unwrap() - 4.1666).abs() < 1e-3);
    assert_eq!(summary.median, Some(3.5));
}

#[tokio::test]
async fn deleted_question_drops_out_of_results() {
    let e = engine().await;
    let sid = e.session.id;
    let kept = e.editor.add_question(sid, QuestionType::Mcq, None).await.unwrap();
    let doomed = e.editor.add_question(sid, QuestionType::Mcq, None).await.unwrap();
    e.editor.update_question_settings(sid, kept.id, abc()).await.unwrap();
    e.editor.update_question_settings(sid, doomed.id, abc()).await.unwrap();

    for who in ["alice", "bob", "carol"] {
        let respondent = RespondentId::new(who);
        e.submissions.update_answer(sid, &respondent, kept.id, None, pick("A")).await.unwrap();
        e.submissions.update_answer(sid, &respondent, doomed.id, None, pick("C")).await.unwrap();
        e.submissions.submit(sid, &respondent).await.unwrap();
    }
    assert_eq!(e.responses.list_for_question(doomed.id).await.unwrap().len(), 3);

    e.editor.delete_question(sid, doomed.id).await.unwrap();

    let questions = e.editor.list_questions(sid).await.unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].display_order, 0);

    let results = e.results.session_results(sid).await.unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].question_id, kept.id);
    assert_eq!(results[0].summary.response_count(), 3);
}

#[tokio::test]
async fn type_change_after_responses_is_rejected() {
    let e = engine().await;
    let sid = e.session.id;
    let q = e.editor.add_question(sid, QuestionType::Mcq, None).await.unwrap();
    e.editor.update_question_settings(sid, q.id, abc()).await.unwrap();
    e.submissions
        .update_answer(sid, &RespondentId::new("alice"), q.id, None, pick("A"))
        .await
        .unwrap();

    let err = e
        .editor
        .update_question_settings(sid, q.id, QuestionSettings::default_for(QuestionType::Text))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::StructuralConflict(_)));
    let stored = e.editor.list_questions(sid).await.unwrap();
    assert_eq!(stored[0].question_type(), QuestionType::Mcq);
}

#[tokio::test]
async fn reorder_keeps_positions_contiguous() {
    let e = engine().await;
    let sid = e.session.id;
    let mut ids = Vec::new();
    for _ in 0..4 {
        ids.push(e.editor.add_question(sid, QuestionType::Text, None).await.unwrap().id);
    }

    let reordered = e.editor.reorder(sid, ids[3], 0).await.unwrap();
    let order: Vec<_> = reordered.iter().map(|q| q.id).collect();
    assert_eq!(order, vec![ids[3], ids[0], ids[1], ids[2]]);
    let positions: Vec<u32> = reordered.iter().map(|q| q.display_order).collect();
    assert_eq!(positions, vec![0, 1, 2, 3]);
}

#[tokio::test]
async fn contribution_template_fans_out_over_teammates() {
    let e = engine().await;
    let sid = e.session.id;
    let q = e
        .editor
        .add_question(
            sid,
            QuestionType::Contribution,
            Some(&TemplateId::new("teammate-contribution")),
        )
        .await
        .unwrap();

    let alice = RespondentId::new("alice");
    let draft = e.submissions.load_draft(sid, &alice).await.unwrap();
    let recipients: Vec<String> = draft
        .responses
        .iter()
        .filter(|r| r.question_id == q.id)
        .filter_map(|r| r.recipient_id.as_ref().map(ToString::to_string))
        .collect();
    assert_eq!(recipients, vec!["alice", "bob", "carol"]);

    for (to, points) in [("alice", 100), ("bob", 120), ("carol", 80)] {
        e.submissions
            .update_answer(
                sid,
                &alice,
                q.id,
                Some(RecipientId::new(to)),
                ResponseDetails::Contribution(ContributionDetails {
                    answer: ContributionAnswer::Points(points),
                }),
            )
            .await
            .unwrap();
    }
    let frozen = e.submissions.submit(sid, &alice).await.unwrap();
    assert_eq!(frozen.len(), 3);
    assert_eq!(
        e.submissions.submission_state(sid, &alice).await.unwrap(),
        SubmissionState::Submitted
    );

    let stats = e.results.response_stats(sid).await.unwrap();
    assert_eq!(stats.expected, 4);
    assert_eq!(stats.submitted, 1);
    assert_eq!(stats.not_started, 3);
}

#[tokio::test]
async fn every_builtin_template_can_be_added() {
    let e = engine().await;
    let sid = e.session.id;
    let catalog = TemplateCatalog::builtin().unwrap();
    for template in catalog.templates() {
        let q = e
            .editor
            .add_question(sid, template.question_type(), Some(&template.id))
            .await
            .unwrap();
        assert!(q.validate().is_ok(), "{}", template.id);
    }
    assert_eq!(e.editor.list_questions(sid).await.unwrap().len(), catalog.len());
}

#[tokio::test]
async fn scale_answers_must_be_in_range_and_on_step() {
    let e = engine().await;
    let sid = e.session.id;
    let q = e.editor.add_question(sid, QuestionType::NumericalScale, None).await.unwrap();
    e.editor
        .update_question_settings(
            sid,
            q.id,
            QuestionSettings::NumericalScale(NumericalScaleSettings {
                min: 1.0,
                max: 5.0,
                step: 1.0,
            }),
        )
        .await
        .unwrap();
    let alice = RespondentId::new("alice");

    for (value, reason) in [(3.5, "step mismatch"), (6.0, "out of range")] {
        let err = e
            .submissions
            .update_answer(sid, &alice, q.id, None, scale(value))
            .await
            .unwrap_err();
        let violations = err.violations().unwrap();
        assert!(violations.violations().iter().any(|v| v.reason.contains(reason)), "{value}");
    }
    e.submissions.update_answer(sid, &alice, q.id, None, scale(3.0)).await.unwrap();
    e.submissions.submit(sid, &alice).await.unwrap();
}
