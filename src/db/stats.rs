use crate::db::store::ReviewStore;
use crate::errors::AppResult;
use crate::utils::colors::{CYAN, GREEN, GREY, RESET, YELLOW};
use std::fs;

pub fn print_db_info(store: &ReviewStore) -> AppResult<()> {
    let conn = store.conn();
    let db_path = store.path();
    println!();

    //
    // 1) FILE SIZE
    //
    let file_size = fs::metadata(db_path).map(|m| m.len()).unwrap_or(0);
    let file_kb = (file_size as f64) / 1024.0;

    println!(
        "{}• File:{} {}{}{}",
        CYAN,
        RESET,
        YELLOW,
        db_path.display(),
        RESET
    );
    println!("{}• Size:{} {:.1} KB", CYAN, RESET, file_kb);

    //
    // 2) DECISIONS
    //
    let (total, reviewed, orphaned, false_triggers): (i64, i64, i64, i64) = conn.query_row(
        "SELECT COUNT(*),
                COALESCE(SUM(reviewed_at IS NOT NULL), 0),
                COALESCE(SUM(orphaned), 0),
                COALESCE(SUM(false_trigger), 0)
         FROM reviews",
        [],
        |row| Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?)),
    )?;

    println!("{}• Decisions:{} {}{}{}", CYAN, RESET, GREEN, total, RESET);
    println!("    reviewed:       {}", reviewed);
    println!("    orphaned:       {}", orphaned);
    println!("    false triggers: {}", false_triggers);

    //
    // 3) FISH COUNTED
    //
    let fish: i64 = conn.query_row("SELECT COALESCE(SUM(count), 0) FROM counts", [], |row| {
        row.get(0)
    })?;
    println!("{}• Fish counted:{} {}", CYAN, RESET, fish);

    //
    // 4) REVIEW WINDOW
    //
    let (first, last): (Option<String>, Option<String>) = conn.query_row(
        "SELECT MIN(reviewed_at), MAX(reviewed_at) FROM reviews",
        [],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    let dash = format!("{GREY}--{RESET}");
    println!("{}• Review window:{}", CYAN, RESET);
    println!("    from: {}", first.unwrap_or_else(|| dash.clone()));
    println!("    to:   {}", last.unwrap_or(dash));

    println!();
    Ok(())
}
