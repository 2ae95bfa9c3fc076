use quiz_core::model::{Outcome, OutcomeVector, ParticipantRecord};
use storage::repository::SessionStore;

use super::test_harness::{answer, participant, setup_view_harness};

#[tokio::test(flavor = "current_thread")]
async fn battle_view_smoke_renders_first_question() {
    let harness = setup_view_harness("user1").await;

    let html = harness.render();
    assert!(html.contains("Question 1 of 3"), "missing progress in {html}");
    assert!(html.contains("10s"), "missing timer in {html}");
    assert!(
        html.contains("What does a balance sheet show?"),
        "missing prompt in {html}"
    );
    assert!(html.contains("cell-unanswered"), "missing indicator in {html}");
    assert!(!html.contains("Next Question"), "unexpected next button in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn battle_view_smoke_shows_feedback_after_answer() {
    let harness = setup_view_harness("user1").await;
    answer(&harness.battle, true).await;

    let html = harness.render();
    assert!(html.contains("Correct! Well done."), "missing feedback in {html}");
    assert!(html.contains("Next Question"), "missing next button in {html}");
    assert!(html.contains("cell-correct"), "missing correct cell in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn battle_view_smoke_explains_wrong_answer() {
    let harness = setup_view_harness("user1").await;
    answer(&harness.battle, false).await;

    let html = harness.render();
    assert!(
        html.contains("Incorrect. The correct answer is Assets, liabilities, and equity"),
        "missing feedback in {html}"
    );
    assert!(html.contains("option-incorrect"), "missing marked option in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn battle_view_smoke_mirrors_opponent() {
    let harness = setup_view_harness("user1").await;
    let opponent = ParticipantRecord::new(
        participant("user2"),
        0,
        OutcomeVector::from_outcomes(vec![Outcome::Incorrect, Outcome::Unanswered, Outcome::Unanswered]),
    );
    harness
        .store
        .write(&harness.session(), &opponent)
        .await
        .expect("write opponent");

    let html = harness.render();
    assert!(html.contains("Opponent"), "missing opponent row in {html}");
    assert!(html.contains("cell-incorrect"), "missing opponent cell in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_smoke_renders_win() {
    let harness = setup_view_harness("user1").await;
    for _ in 0..3 {
        answer(&harness.battle, true).await;
        harness.battle.advance().await;
    }

    let html = harness.render();
    assert!(html.contains("You Win! 🎉"), "missing headline in {html}");
    assert!(html.contains("You scored 3 out of 3"), "missing score in {html}");
    assert!(html.contains("Opponent scored 0 out of 3"), "missing opponent in {html}");
    assert!(html.contains("Play Again"), "missing restart in {html}");
}

#[tokio::test(flavor = "current_thread")]
async fn results_view_smoke_renders_tie() {
    let harness = setup_view_harness("user1").await;
    for _ in 0..3 {
        answer(&harness.battle, false).await;
        harness.battle.advance().await;
    }

    let html = harness.render();
    assert!(html.contains("It&#39;s a Tie!") || html.contains("It's a Tie!"), "missing tie in {html}");
    assert!(html.contains("You scored 0 out of 3"), "missing score in {html}");
}
