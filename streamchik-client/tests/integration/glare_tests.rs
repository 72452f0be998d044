use crate::integration::init_tracing;
use crate::utils::TestPeer;
use serde_json::json;
use std::sync::Arc;
use streamchik_client::{NegotiationError, OfferOutcome, SignalingState};
use tokio::sync::Notify;

fn assert_settled(a: &TestPeer, b: &TestPeer) {
    assert_eq!(a.session.state(), SignalingState::Stable);
    assert_eq!(b.session.state(), SignalingState::Stable);
    assert!(a.pc.is_settled(), "{:?}", a.pc.snapshot());
    assert!(b.pc.is_settled(), "{:?}", b.pc.snapshot());
}

#[tokio::test]
async fn test_crossing_offers_leave_one_survivor() {
    init_tracing();

    for polite_first in [true, false] {
        let mut a = TestPeer::new(1);
        let mut b = TestPeer::new(2);

        assert!(a.session.negotiation_needed().await.unwrap());
        assert!(b.session.negotiation_needed().await.unwrap());
        let offer_a = a.take_offer();
        let offer_b = b.take_offer();

        let (on_a, on_b) = if polite_first {
            let on_a = a.session.handle_offer(b.id, offer_b.clone()).await.unwrap();
            let on_b = b.session.handle_offer(a.id, offer_a).await.unwrap();
            (on_a, on_b)
        } else {
            let on_b = b.session.handle_offer(a.id, offer_a).await.unwrap();
            let on_a = a.session.handle_offer(b.id, offer_b.clone()).await.unwrap();
            (on_a, on_b)
        };
        assert_eq!(on_a, OfferOutcome::Answered);
        assert_eq!(on_b, OfferOutcome::Ignored);
        b.assert_quiet();

        let answer = a.take_answer();
        b.session.handle_answer(answer.clone()).await.unwrap();

        assert_settled(&a, &b);
        let (pc_a, pc_b) = (a.pc.snapshot(), b.pc.snapshot());
        assert_eq!(pc_a.answered, vec![offer_b.sdp.clone()]);
        assert!(pc_b.answered.is_empty());
        assert_eq!(pc_a.remote, Some(offer_b.clone()));
        assert_eq!(pc_b.local, Some(offer_b));
        assert_eq!(pc_a.local, Some(answer.clone()));
        assert_eq!(pc_b.remote, Some(answer));
        a.assert_quiet();
    }
}

#[tokio::test]
async fn test_plain_offer_answer() {
    let mut a = TestPeer::new(1);
    let mut b = TestPeer::new(2);

    // the polite side may offer too when nothing collides
    a.session.negotiation_needed().await.unwrap();
    let offer = a.take_offer();
    assert_eq!(a.session.state(), SignalingState::HaveLocalOffer);

    assert_eq!(
        b.session.handle_offer(a.id, offer.clone()).await.unwrap(),
        OfferOutcome::Answered
    );
    a.session.handle_answer(b.take_answer()).await.unwrap();

    assert_settled(&a, &b);
    assert_eq!(b.pc.snapshot().answered, vec![offer.sdp]);
}

#[tokio::test]
async fn test_polite_side_yields_while_offer_in_flight() {
    init_tracing();
    let gate = Arc::new(Notify::new());
    let mut a = TestPeer::gated(1, gate.clone());
    let mut b = TestPeer::new(2);

    let pending = tokio::spawn({
        let session = a.session.clone();
        async move { session.negotiation_needed().await }
    });
    tokio::task::yield_now().await;
    assert!(a.session.negotiation().making_offer);

    b.session.negotiation_needed().await.unwrap();
    let offer_b = b.take_offer();
    assert_eq!(
        a.session.handle_offer(b.id, offer_b.clone()).await.unwrap(),
        OfferOutcome::Answered
    );
    b.session.handle_answer(a.take_answer()).await.unwrap();

    // our offer resumes against a stable session and becomes a renegotiation
    gate.notify_one();
    assert!(pending.await.unwrap().unwrap());
    let offer_a = a.take_offer();
    assert_eq!(
        b.session.handle_offer(a.id, offer_a.clone()).await.unwrap(),
        OfferOutcome::Answered
    );
    a.session.handle_answer(b.take_answer()).await.unwrap();

    assert_settled(&a, &b);
    assert_eq!(a.pc.snapshot().answered, vec![offer_b.sdp]);
    assert_eq!(b.pc.snapshot().answered, vec![offer_a.sdp]);
    assert!(!a.session.negotiation().making_offer);
}

#[tokio::test]
async fn test_impolite_side_keeps_its_offer_in_flight() {
    let gate = Arc::new(Notify::new());
    let mut a = TestPeer::new(1);
    let mut b = TestPeer::gated(2, gate.clone());

    let pending = tokio::spawn({
        let session = b.session.clone();
        async move { session.negotiation_needed().await }
    });
    tokio::task::yield_now().await;

    a.session.negotiation_needed().await.unwrap();
    let offer_a = a.take_offer();
    assert_eq!(
        b.session.handle_offer(a.id, offer_a).await.unwrap(),
        OfferOutcome::Ignored
    );

    gate.notify_one();
    assert!(pending.await.unwrap().unwrap());
    let offer_b = b.take_offer();

    // a rolls back its applied offer and answers b's
    assert_eq!(
        a.session.handle_offer(b.id, offer_b.clone()).await.unwrap(),
        OfferOutcome::Answered
    );
    b.session.handle_answer(a.take_answer()).await.unwrap();

    assert_settled(&a, &b);
    assert_eq!(a.pc.snapshot().answered, vec![offer_b.sdp]);
    assert!(b.pc.snapshot().answered.is_empty());
}

#[tokio::test]
async fn test_candidate_errors_after_ignored_offer_are_swallowed() {
    let mut a = TestPeer::new(1);
    let b = TestPeer::new(2);

    a.session.negotiation_needed().await.unwrap();
    b.session.negotiation_needed().await.unwrap();
    b.session
        .handle_offer(a.id, a.take_offer())
        .await
        .unwrap();

    // b has no remote description, so the mock rejects the candidate
    b.session
        .handle_ice(json!({"candidate": "candidate:1 1 udp 1 10.0.0.1 9 typ host"}))
        .await
        .unwrap();
    assert!(b.pc.snapshot().candidates.is_empty());

    let c = TestPeer::new(3);
    let err = c.session.handle_ice(json!({"candidate": "x"})).await;
    assert!(matches!(err, Err(NegotiationError::PeerConnection { .. })));
}

#[tokio::test]
async fn test_candidates_apply_after_remote_description() {
    let mut a = TestPeer::new(1);
    let b = TestPeer::new(2);

    a.session.negotiation_needed().await.unwrap();
    b.session.handle_offer(a.id, a.take_offer()).await.unwrap();
    b.session.handle_ice(json!({"candidate": "x"})).await.unwrap();

    assert_eq!(b.pc.snapshot().candidates, vec![json!({"candidate": "x"})]);
}

#[tokio::test]
async fn test_answer_outside_have_local_offer_is_rejected() {
    let a = TestPeer::new(1);

    let err = a
        .session
        .handle_answer(streamchik_client::SessionDescription::answer("v=0"))
        .await;

    assert!(matches!(
        err,
        Err(NegotiationError::InvalidState {
            kind: "answer",
            state: SignalingState::Stable
        })
    ));
    assert!(a.pc.snapshot().remote.is_none());
}

#[tokio::test]
async fn test_second_negotiation_request_is_coalesced() {
    let mut a = TestPeer::new(1);

    assert!(a.session.negotiation_needed().await.unwrap());
    assert!(!a.session.negotiation_needed().await.unwrap());

    a.take_offer();
    a.assert_quiet();
    assert_eq!(a.pc.snapshot().offers_created, 1);
}

#[tokio::test]
async fn test_local_candidate_is_relayed() {
    let mut a = TestPeer::new(1);

    a.session.send_candidate(json!({"candidate": "x"})).unwrap();

    match a.take() {
        streamchik_core::SignalMessage::Ice(body) => {
            assert_eq!(body.candidate(), Some(&json!({"candidate": "x"})));
        }
        other => panic!("expected ice, got {:?}", other),
    }
}
