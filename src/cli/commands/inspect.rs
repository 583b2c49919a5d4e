//! Inspect command - summary of a stored value table

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Parser;

use crate::{
    app::App,
    cli::output::{
        format_action_values, format_number, print_kv, print_section, print_stats_table,
        print_subsection,
    },
    game::Direction,
    q_learning::{QTable, greedy_direction, max_value},
    types::{ActionValues, StateKey},
};

#[derive(Parser, Debug)]
#[command(about = "Inspect a stored value table")]
pub struct InspectArgs {
    /// Path to the value table
    pub table: PathBuf,

    /// Show the values of one state: 16 comma-separated cells, row-major
    #[arg(long, short = 's')]
    pub state: Option<String>,

    /// Show the N states with the highest values
    #[arg(long, default_value_t = 5)]
    pub top: usize,
}

/// Aggregate statistics over every stored value.
#[derive(Debug, Clone, PartialEq)]
pub struct TableStats {
    pub states: usize,
    /// States with at least one non-zero value
    pub visited: usize,
    pub min_value: f64,
    pub max_value: f64,
    pub mean_value: f64,
}

impl TableStats {
    pub fn from_table(table: &QTable) -> Self {
        let mut stats = Self {
            states: table.len(),
            visited: 0,
            min_value: 0.0,
            max_value: 0.0,
            mean_value: 0.0,
        };
        if table.is_empty() {
            return stats;
        }

        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        let mut sum = 0.0;
        for (_, values) in table.iter() {
            if values.iter().any(|&v| v != 0.0) {
                stats.visited += 1;
            }
            for &value in values {
                min = min.min(value);
                max = max.max(value);
                sum += value;
            }
        }
        stats.min_value = min;
        stats.max_value = max;
        stats.mean_value = sum / (table.len() * Direction::COUNT) as f64;
        stats
    }
}

/// States ordered by their best value, highest first; ties by key.
pub fn top_states(table: &QTable, n: usize) -> Vec<(StateKey, ActionValues)> {
    let mut entries: Vec<_> = table.iter().map(|(k, v)| (*k, *v)).collect();
    entries.sort_by(|a, b| {
        max_value(&b.1)
            .total_cmp(&max_value(&a.1))
            .then_with(|| a.0.cmp(&b.0))
    });
    entries.truncate(n);
    entries
}

pub fn execute(args: InspectArgs) -> Result<()> {
    execute_with(&App::new(), args).map(|_| ())
}

pub fn execute_with(app: &App, args: InspectArgs) -> Result<TableStats> {
    let table = app
        .load_table(&args.table)
        .with_context(|| format!("Failed to load {}", args.table.display()))?
        .ok_or_else(|| anyhow!("No value table at {}", args.table.display()))?;
    let stats = TableStats::from_table(&table);

    print_section("Value table");
    print_kv("File", &args.table.display().to_string());
    print_stats_table(&[
        ("States", format_number(stats.states)),
        ("Visited", format_number(stats.visited)),
        ("Min value", format!("{:.3}", stats.min_value)),
        ("Max value", format!("{:.3}", stats.max_value)),
        ("Mean value", format!("{:.3}", stats.mean_value)),
    ]);

    if let Some(raw) = &args.state {
        let key: StateKey = raw.parse()?;
        print_subsection("State");
        println!("{}", key.to_board()?);
        match table.get(&key) {
            Some(values) => {
                print_kv("Values", &format_action_values(values));
                print_kv("Greedy", greedy_direction(values).as_str());
            }
            None => print_kv("Values", "not in table"),
        }
    }

    if args.top > 0 && !table.is_empty() {
        print_subsection(&format!("Top {} states", args.top.min(table.len())));
        for (key, values) in top_states(&table, args.top) {
            println!("  [{key}]");
            println!("    {}", format_action_values(&values));
        }
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{game::Board, types::encode};

    fn key(grid: crate::game::Grid) -> StateKey {
        encode(&Board::from_grid(grid).unwrap())
    }

    #[test]
    fn test_stats_of_empty_table() {
        let stats = TableStats::from_table(&QTable::new());
        assert_eq!(stats.states, 0);
        assert_eq!(stats.mean_value, 0.0);
    }

    #[test]
    fn test_stats_and_top_states() {
        let a = key([[2, 0, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let b = key([[0, 2, 0, 0], [0; 4], [0; 4], [0; 4]]);
        let c = key([[0, 0, 2, 0], [0; 4], [0; 4], [0; 4]]);

        let mut table = QTable::new();
        table.set(a, Direction::Up, 4.0);
        table.set(b, Direction::Left, -4.0);
        table.get_or_init(c);

        let stats = TableStats::from_table(&table);
        assert_eq!(stats.states, 3);
        assert_eq!(stats.visited, 2);
        assert_eq!(stats.min_value, -4.0);
        assert_eq!(stats.max_value, 4.0);
        assert_eq!(stats.mean_value, 0.0);

        let top = top_states(&table, 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].0, a);
        // b and c both peak at 0.0; the smaller key comes first
        assert_eq!(top[1].0, b.min(c));
    }
}
