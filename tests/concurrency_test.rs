//! Tests for concurrent extensions of a game and re-validation of received history.

use async_trait::async_trait;
use connect_four_rules::{BoardSize, Cell, MoveType, Player, replay};
use distributed_connect_four::{
    CanonicalChain, ContentStore, Entry, EntryHash, GameEntry, GameManager, LinkTag, MemoryStore,
    MoveEntry, NewMove, StoreError, ValidationError,
};
use proptest::prelude::*;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

fn drop_piece(game: EntryHash, column: i32, timestamp: u32) -> NewMove {
    NewMove::new(game, MoveType::DropPiece { column }, timestamp)
}

fn candidate(game: EntryHash, author: &str, column: i32, parent: Option<EntryHash>) -> MoveEntry {
    MoveEntry::new(
        game,
        author.into(),
        MoveType::DropPiece { column },
        0,
        parent,
    )
}

/// Publishes and links an entry without any validation, as a misbehaving peer would.
async fn force_link<S: ContentStore>(store: &S, entry: Entry, parent: EntryHash) -> EntryHash {
    let hash = store.publish(entry).await.unwrap();
    store.link(&parent, &hash, LinkTag::NextMove).await.unwrap();
    hash
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_forks_accept_exactly_one() {
    for round in 0..16u32 {
        let store = Arc::new(MemoryStore::new());
        let alice = GameManager::new(Arc::clone(&store), "alice".into());
        let game = alice.create_game("bob".into(), round).await.unwrap();

        let laptop = GameManager::new(Arc::clone(&store), "bob".into());
        let phone = GameManager::new(Arc::clone(&store), "bob".into());

        let a = tokio::spawn(async move { laptop.submit_move(candidate(game, "bob", 0, None)).await });
        let b = tokio::spawn(async move { phone.submit_move(candidate(game, "bob", 6, None)).await });
        let results = [a.await.unwrap(), b.await.unwrap()];

        let accepted: Vec<EntryHash> = results.iter().filter_map(|r| r.clone().ok()).collect();
        assert_eq!(accepted.len(), 1, "round {round}: {results:?}");
        assert!(results.iter().any(|r| matches!(
            r,
            Err(ValidationError::StaleParent { tip: Some(tip) }) if *tip == accepted[0]
        )));

        assert_eq!(alice.tip(&game).await.unwrap(), Some(accepted[0]));
        assert_eq!(*alice.get_state(&game).await.unwrap().moves(), 1);
    }
}

#[tokio::test]
async fn test_sequential_fork_rejected_before_publishing() {
    let store = Arc::new(MemoryStore::new());
    let alice = GameManager::new(Arc::clone(&store), "alice".into());
    let bob = GameManager::new(Arc::clone(&store), "bob".into());
    let game = alice.create_game("bob".into(), 0).await.unwrap();

    let first = bob.submit_move(candidate(game, "bob", 0, None)).await.unwrap();
    let entries = store.len().await;

    let err = bob.submit_move(candidate(game, "bob", 1, None)).await.unwrap_err();
    assert_eq!(err, ValidationError::StaleParent { tip: Some(first) });
    assert_eq!(store.len().await, entries);
}

/// Store that lets a rival move in just before the next move is published.
struct RacingStore {
    inner: MemoryStore,
    rival: Mutex<Option<MoveEntry>>,
}

#[async_trait]
impl ContentStore for RacingStore {
    async fn publish(&self, entry: Entry) -> Result<EntryHash, StoreError> {
        let rival = match entry {
            Entry::Move(_) => self.rival.lock().unwrap().take(),
            Entry::Game(_) => None,
        };
        if let Some(rival) = rival {
            let parent = rival.previous_move().unwrap_or(*rival.game());
            let game = *rival.game();
            let hash = self.inner.publish(Entry::Move(rival)).await?;
            self.inner.link(&parent, &hash, LinkTag::NextMove).await?;
            self.inner.link(&game, &hash, LinkTag::Moves).await?;
        }
        self.inner.publish(entry).await
    }

    async fn link(
        &self,
        base: &EntryHash,
        target: &EntryHash,
        tag: LinkTag,
    ) -> Result<(), StoreError> {
        self.inner.link(base, target, tag).await
    }

    async fn get_links(
        &self,
        base: &EntryHash,
        tag: LinkTag,
    ) -> Result<Vec<EntryHash>, StoreError> {
        self.inner.get_links(base, tag).await
    }

    async fn get_entry(&self, hash: &EntryHash) -> Result<Option<Entry>, StoreError> {
        self.inner.get_entry(hash).await
    }
}

#[tokio::test]
async fn test_race_lost_after_publishing_reports_stale_parent() {
    let store = Arc::new(RacingStore {
        inner: MemoryStore::new(),
        rival: Mutex::new(None),
    });
    let alice = GameManager::new(Arc::clone(&store), "alice".into());
    let bob = GameManager::new(Arc::clone(&store), "bob".into());
    let game = alice.create_game("bob".into(), 0).await.unwrap();

    let rival = candidate(game, "bob", 3, None);
    let rival_hash = Entry::Move(rival.clone()).address().unwrap();
    *store.rival.lock().unwrap() = Some(rival);

    let err = bob.make_move(drop_piece(game, 0, 1)).await.unwrap_err();
    assert_eq!(err, ValidationError::StaleParent { tip: Some(rival_hash) });

    let state = alice.get_state(&game).await.unwrap();
    assert_eq!(*state.moves(), 1);
    assert_eq!(state.board().get(3, 0), Some(Cell::Occupied(Player::Two)));
    assert_eq!(state.board().get(0, 0), Some(Cell::Empty));

    // The losing move stays in the store as an ignored fork.
    let successors = store.get_links(&game, LinkTag::NextMove).await.unwrap();
    assert_eq!(successors.len(), 2);
    assert_eq!(successors[0], rival_hash);

    // Resubmitting on the new tip is Alice's turn, not Bob's.
    alice.make_move(drop_piece(game, 0, 2)).await.unwrap();
}

/// Store that fails one chosen link, or the first read after a `NextMove` link.
#[derive(Default)]
struct FlakyStore {
    inner: MemoryStore,
    fail_link: Mutex<Option<LinkTag>>,
    fail_after_commit: AtomicBool,
    fail_next_read: AtomicBool,
}

#[async_trait]
impl ContentStore for FlakyStore {
    async fn publish(&self, entry: Entry) -> Result<EntryHash, StoreError> {
        self.inner.publish(entry).await
    }

    async fn link(
        &self,
        base: &EntryHash,
        target: &EntryHash,
        tag: LinkTag,
    ) -> Result<(), StoreError> {
        let fail = {
            let mut fail_link = self.fail_link.lock().unwrap();
            if *fail_link == Some(tag) {
                *fail_link = None;
                true
            } else {
                false
            }
        };
        if fail {
            return Err(StoreError::Unavailable("blip".to_string()));
        }
        self.inner.link(base, target, tag).await?;
        if tag == LinkTag::NextMove && self.fail_after_commit.swap(false, Ordering::SeqCst) {
            self.fail_next_read.store(true, Ordering::SeqCst);
        }
        Ok(())
    }

    async fn get_links(
        &self,
        base: &EntryHash,
        tag: LinkTag,
    ) -> Result<Vec<EntryHash>, StoreError> {
        if self.fail_next_read.swap(false, Ordering::SeqCst) {
            return Err(StoreError::Unavailable("blip".to_string()));
        }
        self.inner.get_links(base, tag).await
    }

    async fn get_entry(&self, hash: &EntryHash) -> Result<Option<Entry>, StoreError> {
        self.inner.get_entry(hash).await
    }
}

#[tokio::test]
async fn test_failed_link_leaves_move_unaccepted_and_retry_succeeds() {
    for tag in [LinkTag::Moves, LinkTag::NextMove] {
        let store = Arc::new(FlakyStore::default());
        let alice = GameManager::new(Arc::clone(&store), "alice".into());
        let bob = GameManager::new(Arc::clone(&store), "bob".into());
        let game = alice.create_game("bob".into(), 0).await.unwrap();

        *store.fail_link.lock().unwrap() = Some(tag);
        let err = bob.make_move(drop_piece(game, 0, 1)).await.unwrap_err();
        assert!(err.is_retryable(), "{tag}: {err:?}");
        assert_eq!(*alice.get_state(&game).await.unwrap().moves(), 0, "{tag}");

        let hash = bob.make_move(drop_piece(game, 0, 1)).await.unwrap();
        let state = alice.get_state(&game).await.unwrap();
        assert_eq!(*state.tip(), Some(hash));
        assert_eq!(state.board().get(0, 0), Some(Cell::Occupied(Player::Two)));
    }
}

#[tokio::test]
async fn test_retry_after_commit_returns_accepted_move() {
    let store = Arc::new(FlakyStore::default());
    let alice = GameManager::new(Arc::clone(&store), "alice".into());
    let bob = GameManager::new(Arc::clone(&store), "bob".into());
    let game = alice.create_game("bob".into(), 0).await.unwrap();

    store.fail_after_commit.store(true, Ordering::SeqCst);
    let err = bob.make_move(drop_piece(game, 0, 1)).await.unwrap_err();
    assert!(err.is_retryable());

    // The move landed before the failure.
    let tip = alice.tip(&game).await.unwrap().unwrap();

    assert_eq!(bob.make_move(drop_piece(game, 0, 1)).await.unwrap(), tip);
    let resubmitted = MoveEntry::new(game, "bob".into(), MoveType::DropPiece { column: 0 }, 1, None);
    assert_eq!(bob.submit_move(resubmitted).await, Ok(tip));
    assert_eq!(*alice.get_state(&game).await.unwrap().moves(), 1);

    // Alice can carry on from the accepted move.
    alice.make_move(drop_piece(game, 1, 2)).await.unwrap();
}

#[tokio::test]
async fn test_peers_ignore_invalid_linked_entries() {
    let store = Arc::new(MemoryStore::new());
    let alice = GameManager::new(Arc::clone(&store), "alice".into());
    let bob = GameManager::new(Arc::clone(&store), "bob".into());
    let carol = GameManager::new(Arc::clone(&store), "carol".into());
    let game = alice.create_game("bob".into(), 0).await.unwrap();
    let other_game = alice.create_game("bob".into(), 1).await.unwrap();

    // Alice tries to open although Bob opens.
    force_link(&*store, candidate(game, "alice", 0, None).into(), game).await;
    // An outsider move.
    force_link(&*store, candidate(game, "mallory", 1, None).into(), game).await;
    // A move for a different game.
    force_link(&*store, candidate(other_game, "bob", 2, None).into(), game).await;
    // A game entry where a move belongs.
    let stray = GameEntry::new("eve".into(), "bob".into(), 5, BoardSize::STANDARD);
    force_link(&*store, stray.into(), game).await;
    // A link to an entry this peer never received.
    store
        .link(&game, &EntryHash::from_bytes([1; 32]), LinkTag::NextMove)
        .await
        .unwrap();
    // Out of bounds, by the right author.
    force_link(&*store, candidate(game, "bob", 7, None).into(), game).await;

    assert_eq!(carol.tip(&game).await.unwrap(), None);

    let accepted = bob.make_move(drop_piece(game, 4, 1)).await.unwrap();

    for peer in [&alice, &bob, &carol] {
        let state = peer.get_state(&game).await.unwrap();
        assert_eq!(*state.moves(), 1);
        assert_eq!(*state.tip(), Some(accepted));
        assert_eq!(state.board().get(4, 0), Some(Cell::Occupied(Player::Two)));
        assert_eq!(state.board().pieces(), 1);
    }
}

#[tokio::test]
async fn test_first_valid_successor_wins_over_later_links() {
    let store = Arc::new(MemoryStore::new());
    let alice = GameManager::new(Arc::clone(&store), "alice".into());
    let game = alice.create_game("bob".into(), 0).await.unwrap();

    // Two valid openings linked directly; link order decides.
    let first = force_link(&*store, candidate(game, "bob", 5, None).into(), game).await;
    let second = force_link(&*store, candidate(game, "bob", 2, None).into(), game).await;

    let chain = CanonicalChain::resolve(&*store, &game).await.unwrap();
    assert_eq!(chain.tip(), Some(first));
    assert!(!chain.contains(&second));

    // A move built on the losing fork is not part of the game.
    force_link(&*store, candidate(game, "alice", 5, Some(second)).into(), second).await;
    let chain = CanonicalChain::resolve(&*store, &game).await.unwrap();
    assert_eq!(chain.len(), 1);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(32))]

    #[test]
    fn peers_converge_on_the_same_state(columns in prop::collection::vec(-1i32..9, 0..30)) {
        let runtime = tokio::runtime::Builder::new_current_thread().build().unwrap();
        runtime.block_on(async {
            let store = Arc::new(MemoryStore::new());
            let alice = GameManager::new(Arc::clone(&store), "alice".into());
            let bob = GameManager::new(Arc::clone(&store), "bob".into());
            let carol = GameManager::new(Arc::clone(&store), "carol".into());
            let game = alice.create_game("bob".into(), 0).await.unwrap();

            for (t, column) in columns.iter().enumerate() {
                let state = alice.get_state(&game).await.unwrap();
                let mover = if state.next_agent() == alice.agent() { &alice } else { &bob };
                // Rejections are expected for out-of-range columns and finished games.
                let _ = mover.make_move(drop_piece(game, *column, t as u32)).await;
            }

            let mine = alice.get_state(&game).await.unwrap();
            let theirs = carol.get_state(&game).await.unwrap();
            assert_eq!(mine, theirs);

            let chain = carol.resolve(&game).await.unwrap();
            let replayed = replay(BoardSize::STANDARD, chain.plays()).unwrap();
            assert_eq!(replayed.board(), mine.board());
            assert_eq!(replayed.outcome(), mine.outcome());
        });
    }
}
