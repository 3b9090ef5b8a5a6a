//! Integration tests for the depth pricer.
//!
//! These replay recorded order logs through the public event loop and
//! compare the emitted quote stream line by line.

use depth_pricer::feed::{run, PricingEngine, RunStats};
use depth_pricer::orderbook::{BookController, Order, OrderId, Price, Side};
use depth_pricer::pricing::{Action, LiquidityPricer, Quote};
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

const SESSION: &str = "\
28800538 A b S 44.26 100
28800562 A c B 44.10 100
28800744 R b 100
28800758 A d B 44.18 157
28800773 A e S 44.38 100
28800796 R d 157
28800812 A f B 44.18 157
28800974 A g S 44.27 100
28800975 R e 100
28812071 R f 100
28813129 A h B 43.68 50
28813300 R f 57
28813830 A i S 44.18 100
28814087 A j S 44.18 1000
28814834 R c 100
28814864 A k B 44.09 100
28815774 R k 100
28815804 A l B 44.07 175
28815937 R j 1000
28816245 A m S 44.22 100
";

const SESSION_QUOTES_200: &str = "\
28800758 S 8832.56
28800796 S NA
28800812 S 8832.56
28800974 B 8865.00
28800975 B NA
28812071 S NA
28813129 S 8806.50
28813300 S NA
28813830 B 8845.00
28814087 B 8836.00
28815804 S 8804.25
28815937 B 8845.00
28816245 B 8840.00
";

async fn replay(input: &str, target_size: u32) -> (String, RunStats) {
    let mut output = Vec::new();
    let stats = run(
        input.as_bytes(),
        &mut output,
        target_size,
        std::future::pending(),
    )
    .await
    .expect("replay failed");
    (String::from_utf8(output).expect("output is utf-8"), stats)
}

/// Full recorded session priced for 200 units.
#[tokio::test]
async fn test_session_target_200() {
    let (output, stats) = replay(SESSION, 200).await;

    assert_eq!(output, SESSION_QUOTES_200);
    assert_eq!(
        stats,
        RunStats {
            lines: 20,
            processed: 20,
            rejected: 0,
            quotes: 13,
        }
    );
}

/// Same session priced for a single unit tracks the top of book.
#[tokio::test]
async fn test_session_target_1_tracks_best_prices() {
    let (output, _) = replay(SESSION, 1).await;
    let lines: Vec<&str> = output.lines().collect();

    assert_eq!(lines[0], "28800538 B 44.26");
    assert_eq!(lines[1], "28800562 S 44.10");
    assert_eq!(lines[2], "28800744 B NA");
    assert_eq!(lines[3], "28800758 S 44.18");
    // m rests behind the best ask and changes nothing.
    assert_eq!(lines.last().copied(), Some("28815804 S 44.07"));
}

/// Nothing is emitted while neither side can fill a large target.
#[tokio::test]
async fn test_target_larger_than_book_is_silent() {
    let (output, stats) = replay(SESSION, 1_000_000).await;

    assert_eq!(output, "");
    assert_eq!(stats.processed, 20);
}

/// Malformed and conflicting lines are skipped without disturbing the book.
#[tokio::test]
async fn test_rejected_lines_do_not_change_output() {
    let noisy = SESSION.replace(
        "28800744 R b 100\n",
        "28800744 R b 100\n28800745 R b 1\n28800746 X\n\n28800747 A c S 44.00 10\n",
    );

    let (output, stats) = replay(&noisy, 200).await;

    assert_eq!(output, SESSION_QUOTES_200);
    assert_eq!(stats.lines, 23);
    assert_eq!(stats.rejected, 3);
}

/// The book stays queryable after a replay.
#[test]
fn test_book_state_after_session() {
    let mut engine = PricingEngine::new(200);
    for line in SESSION.lines() {
        engine.handle_line(line).expect("session line rejected");
    }

    let bids = engine.book().bids();
    let asks = engine.book().asks();

    assert_eq!(bids.best_price(), Some(Price::from_cents(4407)));
    assert_eq!(bids.total_quantity(), 225);
    assert_eq!(bids.quantity_of(&OrderId::new("h")), Some(50));
    assert!(!bids.contains(&OrderId::new("f")));

    assert_eq!(asks.best_price(), Some(Price::from_cents(4418)));
    assert_eq!(asks.total_quantity(), 300);
    assert_eq!(
        asks.levels()
            .map(|(price, level)| (price.to_decimal(), level.quantity()))
            .collect::<Vec<_>>(),
        vec![(dec!(44.18), 100), (dec!(44.22), 100), (dec!(44.27), 100)]
    );
}

/// Pricer wired directly to a controller, without the text feed.
#[test]
fn test_pricer_on_controller() {
    let mut controller = BookController::new();
    let mut pricer = LiquidityPricer::attach(&mut controller, 10);

    controller
        .process(Order::add(1, "a", Side::Ask, Price::from_cents(1_000), 6))
        .unwrap();
    controller
        .process(Order::add(2, "b", Side::Ask, Price::from_cents(1_100), 6))
        .unwrap();

    // 6 @ 10.00 + 4 @ 11.00
    assert_eq!(pricer.drain(), vec![Quote::priced(2, Action::Buy, 10_400)]);
    assert_eq!(pricer.drain(), vec![]);
}
