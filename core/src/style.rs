use std::collections::BTreeMap;

use colored::{Color, ColoredString, Colorize};
use crossterm::terminal;

use crate::evaluator::{EvaluationResult, Verdict};

#[macro_export]
macro_rules! print_success {
    ($fmt:literal, $($e:tt)*) => {
        use ::colored::Colorize as _;
        println!("{}", format!($fmt, $($e)*).green())
    }
}

pub fn is_truecolor_supported() -> bool {
    let Ok(v) = std::env::var("COLORTERM") else {
        return false
    };
    matches!(v.as_str(), "truecolor" | "24bit")
}

pub trait ColorTheme {
    fn color(&self) -> Color;
}

impl ColorTheme for Verdict {
    fn color(&self) -> Color {
        use Verdict::*;
        if !self::is_truecolor_supported() {
            return match self {
                Ac | Ok => Color::Green,
                Wa => Color::Yellow,
                Tle => Color::Red,
                Rte => Color::Magenta,
                Err => Color::BrightBlack,
            };
        }

        match self {
            Ac | Ok => Color::TrueColor {
                r: 30,
                g: 180,
                b: 40,
            },
            Wa => Color::TrueColor {
                r: 210,
                g: 138,
                b: 4,
            },
            Tle => Color::TrueColor {
                r: 220,
                g: 42,
                b: 42,
            },
            Rte => Color::TrueColor {
                r: 171,
                g: 40,
                b: 200,
            },
            Err => Color::TrueColor {
                r: 110,
                g: 110,
                b: 110,
            },
        }
    }
}

pub fn verdict_icon(verdict: Verdict) -> ColoredString {
    let fg = if is_truecolor_supported() {
        Color::TrueColor {
            r: 255,
            g: 255,
            b: 255,
        }
    } else {
        Color::BrightBlack
    };
    format!(" {:<3} ", verdict.code())
        .on_color(verdict.color())
        .bold()
        .color(fg)
}

pub fn is_passing(verdict: Verdict) -> bool {
    matches!(verdict, Verdict::Ok | Verdict::Ac)
}

pub fn print_evaluation_line(name: &str, res: &EvaluationResult) {
    println!(
        "{} ... {} [{}ms]",
        name.cyan(),
        self::verdict_icon(res.verdict),
        res.execution_result.elapsed.as_millis(),
    );
}

pub fn print_evaluation_detail(name: &str, res: &EvaluationResult) {
    let (cols, _) = terminal::size().unwrap_or((40, 40));
    let bold_bar = "━".repeat(cols as usize).blue().bold();
    let info = &res.execution_result.info;

    println!(
        "\n{}: {} {}\n{}",
        name.bright_yellow().bold(),
        self::verdict_icon(res.verdict),
        res.verdict.name(),
        bold_bar,
    );
    if let Some(code) = info.exit_code {
        println!("{} {}", "exit code:".cyan().bold(), code);
    }
    if let Some(signal) = &info.exit_signal {
        println!("{} {}", "exit signal:".cyan().bold(), signal);
    }
    if !res.execution_result.stderr.is_empty() {
        println!("{}", "[stderr]".cyan().bold());
        print!("{}", res.execution_result.stderr);
    }
    println!("{}", bold_bar);
}

pub fn print_evaluation_summary(verdicts: &[Verdict]) {
    let bar = "-".repeat(5);
    print!("{} ", bar);

    let count: BTreeMap<String, (Verdict, usize)> =
        verdicts.iter().fold(BTreeMap::new(), |mut count, &v| {
            count.entry(v.code()).or_insert((v, 0)).1 += 1;
            count
        });

    let num_total = verdicts.len();
    let num_passed = verdicts.iter().filter(|&&v| is_passing(v)).count();
    let num_failed = num_total - num_passed;

    if num_passed == num_total {
        print!("{}", format!("All {} runs OK", num_total).green());
    } else {
        let summary_msg = if num_passed > 0 {
            format!("{}/{} runs failed", num_failed, num_total)
        } else {
            format!("All {} runs failed", num_total)
        };

        let detail_msg = count
            .values()
            .filter(|(v, _)| !is_passing(*v))
            .map(|&(v, cnt)| {
                format!(
                    "{}{}{}",
                    self::verdict_icon(v),
                    "x".dimmed(),
                    cnt.to_string().bold().bright_white(),
                )
            })
            .collect::<Vec<String>>()
            .join(", ");

        print!("{} ({})", summary_msg.bright_red(), detail_msg);
    }

    println!(" {}", bar);
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn passing_verdicts() {
        assert!(is_passing(Verdict::Ok));
        assert!(is_passing(Verdict::Ac));
        assert!(!is_passing(Verdict::Rte));
        assert!(!is_passing(Verdict::Tle));
        assert!(!is_passing(Verdict::Wa));
    }

    #[test]
    fn icon_contains_verdict_code() {
        colored::control::set_override(false);
        assert_eq!(verdict_icon(Verdict::Tle).to_string(), " TLE ");
        assert_eq!(verdict_icon(Verdict::Ok).to_string(), " OK  ");
    }
}
