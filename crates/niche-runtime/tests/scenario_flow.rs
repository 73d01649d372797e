use niche_core::{
    Assumptions, BookSize, EbookData, EbookRoyaltyRate, FormatType, GlobalData, InteriorType,
    Marketplace, PaperbackData,
};
use niche_runtime::ranking::{rank, RankQuery};
use niche_runtime::{Inputs, Session};
use persistence::{FileStore, MemoryStore, NicheSnapshot, NicheStore};
use rust_decimal::Decimal;

fn ebook_inputs() -> Inputs {
    Inputs {
        global: GlobalData {
            marketplace: Some(Marketplace::ES),
            target_margin_pct: Some(Decimal::new(30, 0)),
            cpc: Some(Decimal::new(35, 2)),
            competitor_daily_sales: Some(Decimal::new(5, 0)),
            selected_format: Some(FormatType::Ebook),
        },
        ebook: EbookData {
            list_price: Some(Decimal::new(499, 2)),
            royalty_rate: EbookRoyaltyRate::Seventy,
            file_size_mb: Some(Decimal::new(2, 0)),
            audiovisual: false,
        },
        paperback: PaperbackData {
            interior: Some(InteriorType::BN),
            size: Some(BookSize::Small),
            list_price: Some(Decimal::new(1299, 2)),
            pages: Some(100),
            ..Default::default()
        },
    }
}

fn computed(s: &NicheSnapshot) -> NicheSnapshot {
    NicheSnapshot {
        global: Default::default(),
        ebook: None,
        paperback: None,
        ..s.clone()
    }
}

#[test]
fn ebook_scenario_is_capped() {
    let mut session = Session::new(Assumptions::default(), MemoryStore::new());
    session.calculator.set_inputs(ebook_inputs());
    let saved = session.save_as_new("Short reads").unwrap();
    let score = saved.snapshot.score.clone().unwrap();
    assert_eq!(saved.snapshot.max_clicks_per_sale, Some(9));
    assert_eq!(score.clicks_score, 0);
    assert!(score.clicks_capped);
    assert!(score.total_score <= 40);
}

#[test]
fn restore_then_resave_reproduces_computed_fields() {
    let mut session = Session::new(Assumptions::default(), MemoryStore::new());
    session.calculator.set_inputs(ebook_inputs());
    let saved = session.save_as_new("Planner").unwrap();
    let v1 = saved.versions[0].clone();

    session.calculator.inputs_mut().global.selected_format = Some(FormatType::Paperback);
    session.calculator.inputs_mut().global.cpc = Some(Decimal::new(20, 2));
    let changed = session.save_changes(saved.id, Some("paperback".into())).unwrap().unwrap();
    assert_ne!(computed(&changed.snapshot), computed(&v1.snapshot));

    let restored = session.restore(saved.id, v1.id).unwrap();
    assert_eq!(restored.versions.len(), 3);
    assert_eq!(session.calculator.inputs(), &ebook_inputs());

    let resaved = session.save_changes(saved.id, None).unwrap().unwrap();
    let latest = resaved.current_version().unwrap();
    assert_eq!(resaved.versions.len(), 4);
    assert_eq!(computed(&latest.snapshot), computed(&v1.snapshot));
    assert_eq!(latest.snapshot, v1.snapshot);
}

#[test]
fn unknown_ids_are_not_found() {
    let mut session = Session::new(Assumptions::default(), MemoryStore::new());
    session.calculator.set_inputs(ebook_inputs());
    let saved = session.save_as_new("Kept").unwrap();
    let ghost = uuid::Uuid::new_v4();
    assert!(session.save_changes(ghost, None).unwrap().is_none());
    assert!(session.restore(saved.id, ghost).is_none());
    assert!(session.restore(ghost, saved.versions[0].id).is_none());
}

#[test]
fn collection_survives_restart_on_disk() -> anyhow::Result<()> {
    let dir = tempfile::tempdir()?;
    let before = {
        let mut session = Session::new(Assumptions::default(), FileStore::open(dir.path())?);
        session.calculator.set_inputs(ebook_inputs());
        let a = session.save_as_new("Ebook first")?;
        session.calculator.inputs_mut().global.selected_format = Some(FormatType::Paperback);
        session.save_as_new("Paperback second")?;
        session.calculator.set_inputs(ebook_inputs());
        session.save_changes(a.id, Some("same inputs".into()))?;
        session.store.list().to_vec()
    };

    let store = NicheStore::load(FileStore::open(dir.path())?);
    assert_eq!(store.list(), before.as_slice());
    assert_eq!(store.list()[0].versions.len(), 2);
    assert_eq!(store.list()[0].snapshot, store.list()[0].versions[0].snapshot);
    assert_eq!(store.find_best().map(|n| n.name.as_str()), Some("Paperback second"));

    let ranked = rank(store.list(), &RankQuery::default());
    assert_eq!(ranked[0].name, "Paperback second");
    Ok(())
}

#[test]
fn best_follows_a_niche_updated_past_another() {
    let mut session = Session::new(Assumptions::default(), MemoryStore::new());
    session.calculator.set_inputs(ebook_inputs());
    let first = session.save_as_new("Ebook first").unwrap();

    let mut tight = ebook_inputs();
    tight.global.selected_format = Some(FormatType::Paperback);
    tight.global.cpc = Some(Decimal::new(50, 2));
    session.calculator.set_inputs(tight);
    let second = session.save_as_new("Tight paperback").unwrap();
    assert!(second.snapshot.total_score() > first.snapshot.total_score());
    assert_eq!(session.store.find_best().map(|n| n.id), Some(second.id));

    let mut strong = ebook_inputs();
    strong.global.selected_format = Some(FormatType::Paperback);
    session.calculator.set_inputs(strong);
    let updated = session.save_changes(first.id, None).unwrap().unwrap();
    assert_eq!(updated.snapshot.total_score(), 100);
    assert!(updated.snapshot.total_score() > second.snapshot.total_score());

    assert_eq!(session.store.find_best().map(|n| n.id), Some(first.id));
    let ranked = rank(session.store.list(), &RankQuery::default());
    assert_eq!(ranked[0].id, first.id);
    assert_eq!(ranked[1].id, second.id);
}
