use formulix_rs::catalog::{CatalogHandle, Suggestion};
use formulix_rs::config::EngineConfig;
use formulix_rs::sheet::{render_outcome, toggle_lock, FormulaSheet};
use std::time::Duration;

#[tokio::main]
async fn main() {
    pretty_env_logger::init();

    let config = EngineConfig::from_env().expect("invalid configuration");
    let evaluator = config.evaluator();

    let catalog = CatalogHandle::default();
    catalog
        .refresh(async {
            tokio::time::sleep(Duration::from_millis(100)).await;
            Ok::<_, String>(vec![
                Suggestion::new("1", "rent", 1200.0),
                Suggestion::new("2", "months", 12.0),
            ])
        })
        .await
        .expect("catalog fetch failed");

    let sheet = FormulaSheet::new().into_shared();
    sheet
        .lock()
        .unwrap()
        .set_formula(0, vec!["rent".into(), "*".into(), "months".into()])
        .unwrap();

    let task = toggle_lock(&sheet, 0, config.lock_delay).expect("row 0 exists");
    println!("Locking row 0...");
    let locked = task.wait().await.expect("lock task interrupted");
    println!("Row 0 locked: {:?}", locked);

    let mut sheet = sheet.lock().unwrap();
    if let Err(err) = sheet.push_token(0, "+") {
        println!("Edit refused: {}", err);
    }

    let snapshot = catalog.snapshot();
    for outcome in sheet.evaluate_all(&evaluator, &snapshot) {
        println!("Result: {}", render_outcome(&outcome));
    }
}
