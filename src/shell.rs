use crate::config::Config;
use crate::error::GachaError;
use crate::gacha::{Gacha, Roll, RollEvent};
use crate::i18n::{I18n, Language};
use crate::ledger::{batch_counts, Ledger};
use crate::pricing::{stone_cost_for, stone_fee_for};
use crate::rng::Rng;
use crate::table::Relief;
use log::{info, warn};
use std::io::{BufRead, Write};

const RULE: &str = "----------------------------------------";

/// Numeric argument after a command letter.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Arg {
    Missing,
    Value(u64),
    Invalid(String),
}

impl Arg {
    fn parse(token: Option<&str>) -> Self {
        match token {
            None => Arg::Missing,
            Some(t) => match t.parse::<u64>() {
                Ok(0) => Arg::Missing,
                Ok(n) => Arg::Value(n),
                Err(_) => Arg::Invalid(t.to_string()),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Purchase(Arg),
    Summon(Arg),
    /// `None` toggles.
    PickUp(Option<bool>),
    Table,
    Reset,
    Exit,
    Help,
    Unknown(String),
}

impl Command {
    /// Dispatches on the first character; an empty line is a quick summon.
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        let mut tokens = line.split_whitespace();
        let head = match tokens.next() {
            Some(h) => h,
            None => return Command::Summon(Arg::Missing),
        };
        let arg = tokens.next();
        match head.chars().next().map(|c| c.to_ascii_lowercase()) {
            Some('c') => Command::Purchase(Arg::parse(arg)),
            Some('g') => Command::Summon(Arg::parse(arg)),
            Some('p') => Command::PickUp(arg.and_then(|a| match a.to_ascii_lowercase().as_str() {
                "on" | "true" | "1" => Some(true),
                "off" | "false" | "0" => Some(false),
                _ => None,
            })),
            Some('t') => Command::Table,
            Some('r') => Command::Reset,
            Some('e') | Some('q') => Command::Exit,
            Some('h') => Command::Help,
            _ => Command::Unknown(line.to_string()),
        }
    }
}

/// Interactive session: one engine, one ledger.
pub struct Shell {
    config: Config,
    lang: Language,
    seed: Option<u64>,
    resets: u64,
    gacha: Gacha<Rng>,
    ledger: Ledger,
}

impl Shell {
    pub fn new(config: Config, lang: Language, seed: Option<u64>) -> Self {
        let gacha = Gacha::new(Self::make_rng(seed, 0), config.pick_up, lang);
        let ledger = Ledger::new(gacha.slot_count());
        Shell { config, lang, seed, resets: 0, gacha, ledger }
    }

    fn make_rng(seed: Option<u64>, resets: u64) -> Rng {
        match seed {
            Some(s) => Rng::from_seed(s.wrapping_add(resets)),
            None => Rng::new(),
        }
    }

    /// Fresh engine and ledger, as at startup.
    pub fn setup(&mut self) {
        self.resets += 1;
        self.gacha = Gacha::new(Self::make_rng(self.seed, self.resets), self.config.pick_up, self.lang);
        self.ledger.reset(self.gacha.slot_count());
        info!("Session reset (#{})", self.resets);
    }

    pub fn gacha(&self) -> &Gacha<Rng> {
        &self.gacha
    }

    pub fn ledger(&self) -> &Ledger {
        &self.ledger
    }

    fn text(&self, key: &str) -> String {
        I18n::get(self.lang, key)
    }

    pub fn print_banner<O: Write>(&self, out: &mut O) -> Result<(), GachaError> {
        writeln!(out, "{}", self.text("header_title"))?;
        match self.seed {
            Some(seed) => writeln!(out, "{}", I18n::fill(&self.text("header_seed"), &[&seed]))?,
            None => writeln!(out, "{}", self.text("header_entropy"))?,
        }
        writeln!(out, "{}", I18n::fill(&self.text("header_mode"), &[&self.gacha.is_pick_up()]))?;
        Ok(())
    }

    /// Reads commands until exit or end of input.
    pub fn run<I: BufRead, O: Write>(&mut self, input: I, out: &mut O) -> Result<(), GachaError> {
        self.print_banner(out)?;
        let mut lines = input.lines();
        loop {
            self.print_status(out)?;
            write!(out, ">> ")?;
            out.flush()?;

            let line = match lines.next() {
                Some(line) => line?,
                None => break,
            };
            if !self.execute(Command::parse(&line), out)? {
                break;
            }
        }
        Ok(())
    }

    /// Runs one command. Returns `false` when the session should end.
    pub fn execute<O: Write>(&mut self, command: Command, out: &mut O) -> Result<bool, GachaError> {
        match command {
            Command::Purchase(arg) => {
                let cap = self.config.max_purchase as u64;
                let stones = self.resolve(arg, self.config.default_purchase as u64, Some(cap), out)?;
                match self.ledger.purchase(stones) {
                    Some(fee) => writeln!(out, "{}", I18n::fill(&self.text("purchase"), &[&fee]))?,
                    None => {
                        warn!("Purchase of {} stones refused, ledger would overflow", stones);
                        writeln!(out, "{}", I18n::fill(&self.text("purchase_refused"), &[&stones]))?
                    }
                }
            }
            Command::Summon(arg) => {
                let cap = self.config.max_trials as u64;
                let trials = self.resolve(arg, self.config.default_trials as u64, Some(cap), out)?;
                self.summon(trials, out)?;
            }
            Command::PickUp(state) => {
                let active = state.unwrap_or(!self.gacha.is_pick_up());
                self.gacha.set_pick_up_mode(active);
                self.ledger.resize_counts(self.gacha.slot_count());
                writeln!(out, "{}", I18n::fill(&self.text("pick_up_changed"), &[&active]))?;
            }
            Command::Table => {
                writeln!(out, "{}", self.text("table_header"))?;
                writeln!(out, "{}", self.gacha.table())?;
            }
            Command::Reset => {
                writeln!(out, "{}", self.text("reset"))?;
                self.setup();
            }
            Command::Exit => {
                writeln!(out, "{}", self.text("exit_msg"))?;
                return Ok(false);
            }
            Command::Help => writeln!(out, "{}", self.text("help"))?,
            Command::Unknown(_) => writeln!(out, "{}", self.text("unknown_command"))?,
        }
        Ok(true)
    }

    fn resolve<O: Write>(
        &self,
        arg: Arg,
        default: u64,
        cap: Option<u64>,
        out: &mut O,
    ) -> Result<u64, GachaError> {
        let n = match arg {
            Arg::Missing => default,
            Arg::Value(n) => n,
            Arg::Invalid(_) => {
                writeln!(out, "{}", self.text("invalid_number"))?;
                default
            }
        };
        match cap {
            Some(cap) if n > cap => {
                writeln!(out, "{}", I18n::fill(&self.text("capped"), &[&cap]))?;
                Ok(cap)
            }
            _ => Ok(n),
        }
    }

    fn summon<O: Write>(&mut self, trials: u64, out: &mut O) -> Result<(), GachaError> {
        if let Some(missing) = self.ledger.shortfall(trials) {
            writeln!(
                out,
                "{}",
                I18n::fill(&self.text("shortfall"), &[&self.config.stone_name, &missing])
            )?;
            return Ok(());
        }

        writeln!(out, "{}", I18n::fill(&self.text("trials"), &[&trials]))?;
        let roll = match self.gacha.roll(trials as u32) {
            Ok(roll) => roll,
            Err(GachaError::InvalidTable { sum }) => {
                writeln!(out, "{}", I18n::fill(&self.text("invalid_table"), &[&sum]))?;
                return Ok(());
            }
            Err(e) => return Err(e),
        };
        self.print_events(&roll, out)?;
        if roll.is_empty() {
            return Ok(());
        }

        let (before, after) = self.ledger.spend(&roll);
        writeln!(
            out,
            "{}",
            I18n::fill(&self.text("stones_left"), &[&self.config.stone_name, &before, &after])
        )?;
        self.ledger.record(&roll);
        self.print_roll(&roll, out)
    }

    fn print_events<O: Write>(&self, roll: &Roll, out: &mut O) -> Result<(), GachaError> {
        for event in &roll.events {
            let line = match event {
                RollEvent::NoTrials => self.text("no_trials"),
                RollEvent::SamplingFallthrough { value } => {
                    I18n::fill(&self.text("fallthrough"), &[value])
                }
                RollEvent::ReliefApplied { relief: Relief::Rare, .. } => self.text("rare_relief"),
                RollEvent::ReliefApplied { relief: Relief::Servant, .. } => self.text("servant_relief"),
                RollEvent::ReliefSkipped { sum, .. } => I18n::fill(&self.text("relief_skipped"), &[sum]),
            };
            writeln!(out, "{}", line)?;
        }
        Ok(())
    }

    fn print_counts<O: Write>(&self, counts: &[u64], out: &mut O) -> Result<(), GachaError> {
        for (label, count) in self.gacha.outcome_labels().iter().zip(counts) {
            writeln!(out, "{}: {}", label, count)?;
        }
        Ok(())
    }

    fn print_roll<O: Write>(&self, roll: &Roll, out: &mut O) -> Result<(), GachaError> {
        let n = roll.len() as u64;
        let stones = stone_cost_for(n);
        writeln!(out, "\n{}", RULE)?;
        writeln!(
            out,
            "{}",
            I18n::fill(
                &self.text("batch_header"),
                &[&n, &self.config.stone_name, &stones, &stone_fee_for(stones).unwrap_or(u64::MAX)]
            )
        )?;
        self.print_counts(&batch_counts(roll, self.gacha.slot_count()), out)?;
        writeln!(out, "{}", RULE)?;

        writeln!(out, "\n{}", RULE)?;
        writeln!(
            out,
            "{}",
            I18n::fill(
                &self.text("session_header"),
                &[&self.config.stone_name, &self.ledger.total_stones_used(), &self.ledger.total_fee()]
            )
        )?;
        self.print_counts(self.ledger.counts(), out)?;
        writeln!(out, "{}", RULE)?;
        Ok(())
    }

    fn print_status<O: Write>(&self, out: &mut O) -> Result<(), GachaError> {
        writeln!(out, "{}", RULE)?;
        writeln!(out, "{}", I18n::fill(&self.text("status_spend"), &[&self.ledger.cumulative_spend()]))?;
        writeln!(
            out,
            "{}",
            I18n::fill(&self.text("status_stones"), &[&self.config.stone_name, &self.ledger.stones()])
        )?;
        writeln!(out, "\n{}", self.text("menu"))?;
        Ok(())
    }
}
