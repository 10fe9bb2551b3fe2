//! Practice command implementation.

use anyhow::Result;
use console::style;
use rand::SeedableRng;
use rand::rngs::SmallRng;

use skinfaxi_bb84::Exercise;

/// Execute the practice command.
pub fn execute(rows: usize, seed: Option<u64>, answers: Option<&str>, reveal: bool) -> Result<()> {
    let mut rng = match seed {
        Some(seed) => SmallRng::seed_from_u64(seed),
        None => SmallRng::from_entropy(),
    };
    let exercise = Exercise::generate(rows, &mut rng);

    println!(
        "{} Basis-matching drill — enter the ideal receiver bit (0, 1 or r)",
        style("→").cyan().bold()
    );
    println!("\n  {:>4}  {:>14}  {:>12}{}", "#", "polarisation", "analyser", if reveal { "  expected" } else { "" });
    for row in &exercise.rows {
        print!("  {:>4}  {:>13}°  {:>11}°", row.seq, row.polarisation, row.analyser);
        if reveal {
            print!("  {:>8}", style(row.expected.symbol()).green());
        }
        println!();
    }

    match answers {
        Some(answers) => {
            let answers: Vec<&str> = answers.split(',').map(str::trim).collect();
            let score = exercise.grade(&answers);
            println!(
                "\n{} Score: {} / {}",
                style("✓").green().bold(),
                style(score.correct).green(),
                score.total
            );
            for (row, ok) in exercise.rows.iter().zip(&score.results) {
                if !ok {
                    println!(
                        "  row {}: expected {}",
                        row.seq,
                        style(row.expected.symbol()).yellow()
                    );
                }
            }
        }
        None if !reveal => {
            println!(
                "\n  Grade your answers with {}",
                style("skinfaxi practice --seed <seed> --answers 0,r,1,...").cyan()
            );
        }
        None => {}
    }
    Ok(())
}
