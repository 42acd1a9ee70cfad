use formulix_rs::catalog::{Catalog, Suggestion};
use formulix_rs::config::EngineConfig;
use formulix_rs::sheet::{render_outcome, FormulaSheet};

fn main() {
    pretty_env_logger::init();

    let config = EngineConfig::from_env().expect("invalid configuration");
    let evaluator = config.evaluator();

    let catalogs = vec![
        Catalog::new(vec![
            Suggestion::new("1", "price", 120.0),
            Suggestion::new("2", "volume", 3000.0),
        ]),
        Catalog::new(vec![
            Suggestion::new("1", "price", 80.0),
            Suggestion::new("2", "volume", 6000.0),
        ]),
    ];

    let mut sheet = FormulaSheet::new();
    for token in ["price", "*", "volume"] {
        sheet.push_token(0, token).expect("row 0 exists");
    }
    let row = sheet.len();
    sheet.add_row();
    for token in ["volume", "/", "(", "price", "-", "80", ")"] {
        sheet.push_token(row, token).expect("row exists");
    }

    for (i, catalog) in catalogs.iter().enumerate() {
        let outcomes = sheet.evaluate_all(&evaluator, catalog);
        for (index, outcome) in outcomes.iter().enumerate() {
            println!(
                "Catalog {} | {:<28} => {}",
                i,
                sheet.display(index).unwrap_or_default(),
                render_outcome(outcome)
            );
        }
    }
}
