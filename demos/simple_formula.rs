use formulix_rs::ast::Evaluator;
use formulix_rs::catalog::{Catalog, Suggestion};
use formulix_rs::sheet::render_outcome;

fn main() {
    pretty_env_logger::init();

    let catalog = Catalog::new(vec![
        Suggestion::new("1", "price", 120.0),
        Suggestion::new("2", "volume", 3000.0),
    ]);

    let evaluator = Evaluator::new(100);
    let formulas: [&[&str]; 4] = [
        &["price", "*", "volume", "/", "1000"],
        &["(", "price", "-", "20", ")", "^", "2"],
        &["price", "/", "0"],
        &[],
    ];

    for tokens in formulas {
        let outcome = evaluator.evaluate(tokens, &catalog);
        println!("{:<32} => {}", tokens.join(" "), render_outcome(&outcome));
    }
}
