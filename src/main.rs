//! RPS Settlement Demo
//!
//! Plays one commit-reveal game through the async service and one
//! proof-resolved game directly against the engine, logging every event.

use anyhow::Context;
use tracing::info;
use tracing_subscriber::EnvFilter;

use rps_settlement::{
    VERSION, Address, Call, EngineConfig, FieldCommitment, Move, ProofResolution,
    RevealResolution, Secret, SettlementEngine, Sha256Commitment, COIN, CommitmentScheme,
    host::{GameCommand, GameService, InMemoryLedger, SystemClock},
    proof::{MoveOpening, ProofWitness, ReplayProofVerifier},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = EngineConfig::from_env()?;
    info!("RPS Settlement v{}", VERSION);
    info!(
        reveal_timeout = config.reveal_timeout_secs,
        lobby_timeout = config.lobby_timeout_secs,
        proof_timeout = ?config.proof_timeout_secs,
        "Timeout windows"
    );

    let alice = Address::new([0xA1; 20]);
    let bob = Address::new([0xB0; 20]);

    demo_reveal_game(config, alice, bob).await?;
    demo_proof_game(config, alice, bob)?;

    Ok(())
}

/// Commit-reveal game driven by JSON commands.
async fn demo_reveal_game(config: EngineConfig, alice: Address, bob: Address) -> anyhow::Result<()> {
    info!("=== Reveal Game ===");

    let mut ledger = InMemoryLedger::new();
    ledger.fund(alice, 10 * COIN);
    ledger.fund(bob, 10 * COIN);
    let service = GameService::new(SettlementEngine::with_config(
        RevealResolution::new(),
        ledger,
        SystemClock,
        config,
    ));
    let mut events = service.subscribe();

    let secret_a = Secret::generate();
    let secret_b = Secret::generate();

    let opened = service
        .execute(
            Call::new(alice, COIN),
            GameCommand::OpenGame {
                opponent: Some(bob),
                commitment: Sha256Commitment.commit(Move::Rock, &secret_a),
            },
        )
        .await?;
    info!(?opened, "Alice opened");

    let join = format!(
        r#"{{"type":"join_game","game_id":0,"commitment":"{}"}}"#,
        Sha256Commitment.commit(Move::Scissors, &secret_b)
    );
    service.execute_json(Call::new(bob, COIN), &join).await?;

    for (who, mv, secret) in [(alice, Move::Rock, &secret_a), (bob, Move::Scissors, &secret_b)] {
        let outcome = service
            .execute(
                Call::sender(who),
                GameCommand::RevealMove { game_id: 0, move_code: mv.code(), secret: secret.clone() },
            )
            .await?;
        info!(player = %who.short(), ?mv, ?outcome, "Revealed");
    }

    while let Ok(event) = events.try_recv() {
        info!("{}", serde_json::to_string(&event)?);
    }

    let (balance_a, balance_b) = service
        .with_ledger(|l| (l.balance_of(&alice), l.balance_of(&bob)))
        .await;
    info!(alice = %balance_a, bob = %balance_b, "Final balances");
    Ok(())
}

/// Proof-resolved game using the replay verifier.
fn demo_proof_game(config: EngineConfig, alice: Address, bob: Address) -> anyhow::Result<()> {
    info!("=== Proof Game ===");

    let mut ledger = InMemoryLedger::new();
    ledger.fund(alice, 10 * COIN);
    ledger.fund(bob, 10 * COIN);
    let mut engine = SettlementEngine::with_config(
        ProofResolution::new(ReplayProofVerifier),
        ledger,
        SystemClock,
        config,
    );

    let opening_a = MoveOpening::generate(Move::Paper);
    let opening_b = MoveOpening::generate(Move::Scissors);

    let id = engine.open_game(Call::new(alice, COIN), None, opening_a.commitment(&FieldCommitment))?;
    engine.join_game(Call::new(bob, COIN), id, opening_b.commitment(&FieldCommitment))?;

    let proof = ProofWitness::new(opening_a, opening_b)
        .to_proof_bytes()
        .context("encoding proof witness")?;
    let outcome = engine.submit_proof(Call::sender(bob), id, 2, proof)?;
    info!(game_id = id, ?outcome, "Proof accepted");

    for event in engine.drain_events() {
        info!("{}", serde_json::to_string(&event)?);
    }

    let game = engine.get_game(id)?;
    info!(
        game_id = id,
        state = ?game.state,
        hash = %hex::encode(game.compute_hash()),
        "Final record"
    );
    Ok(())
}
