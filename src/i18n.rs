use crate::config::Config;
use crate::table::{Category, SlotKind};
use colored::*;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Language {
    En,
    Ja,
}

impl Language {
    pub fn parse(s: &str) -> Option<Self> {
        let lower = s.to_lowercase();
        if lower.starts_with("ja") || lower.starts_with("jp") {
            Some(Language::Ja)
        } else if lower.starts_with("en") {
            Some(Language::En)
        } else {
            None
        }
    }

    pub fn from_config(config: &Config) -> Self {
        config
            .language
            .as_deref()
            .and_then(Self::parse)
            .unwrap_or_else(Self::from_env)
    }

    pub fn from_env() -> Self {
        if let Ok(lang) = std::env::var("LANG") {
            if lang.to_lowercase().starts_with("ja") {
                return Language::Ja;
            }
        }
        Language::En
    }
}

pub struct I18n;

impl I18n {
    /// Substitutes each `{}` in `template` with the next argument.
    pub fn fill(template: &str, args: &[&dyn std::fmt::Display]) -> String {
        let mut out = String::with_capacity(template.len());
        let mut rest = template;
        let mut args = args.iter();
        while let Some(pos) = rest.find("{}") {
            out.push_str(&rest[..pos]);
            match args.next() {
                Some(arg) => out.push_str(&arg.to_string()),
                None => out.push_str("{}"),
            }
            rest = &rest[pos + 2..];
        }
        out.push_str(rest);
        out
    }

    pub fn slot_label(lang: Language, kind: &SlotKind) -> String {
        let up = match (lang, kind.pick_up) {
            (_, false) => "",
            (Language::En, true) => " (Pick-up)",
            (Language::Ja, true) => "(ﾋﾟｯｸｱｯﾌﾟ)",
        };
        match (lang, kind.category) {
            (Language::En, Category::Servant) => format!("Servant {}★{}", kind.rarity, up),
            (Language::En, Category::CraftEssence) => format!("Craft Essence {}★{}", kind.rarity, up),
            (Language::Ja, Category::Servant) => format!("鯖☆{}{}", kind.rarity, up),
            (Language::Ja, Category::CraftEssence) => format!("礼☆{}{}", kind.rarity, up),
        }
    }

    pub fn get(lang: Language, key: &str) -> String {
        match (lang, key) {
            // === Header ===
            (Language::En, "header_title") => format!("{}", "=== Summon Simulator ===".purple().bold()),
            (Language::Ja, "header_title") => format!("{}", "=== ガチャシミュレータ ===".purple().bold()),

            (Language::En, "header_mode") => "Pick-up banner: {}".to_string(),
            (Language::Ja, "header_mode") => "ピックアップ状態: {}".to_string(),

            (Language::En, "header_seed") => format!("{}", "[System] PRNG: xoshiro256** (seed {})".blue()),
            (Language::Ja, "header_seed") => format!("{}", "[システム] 乱数生成器: xoshiro256** (シード {})".blue()),

            (Language::En, "header_entropy") => format!("{}", "[System] PRNG: xoshiro256** (clock-stirred every draw)".blue()),
            (Language::Ja, "header_entropy") => format!("{}", "[システム] 乱数生成器: xoshiro256** (毎回時刻で再シード)".blue()),

            // === Status ===
            (Language::En, "status_spend") => "Total spend: ¥{}".to_string(),
            (Language::Ja, "status_spend") => "累計課金額: {}円".to_string(),

            (Language::En, "status_stones") => "{} owned: {}".to_string(),
            (Language::Ja, "status_stones") => "所持{}: {}".to_string(),

            (Language::En, "menu") => "Buy (stones): c, Summon: g, Pick-up: p, Table: t, Reset: r, Exit: e, Help: h".to_string(),
            (Language::Ja, "menu") => "課金(石数): c, ガチャ: g, ピックアップ: p, 確率表: t, リセット: r, 終了: e, ヘルプ: h".to_string(),

            // === Commands ===
            (Language::En, "purchase") => format!("{}", "Used the wonderful magic card! - ¥{}".green()),
            (Language::Ja, "purchase") => format!("{}", "素晴らしい魔法のカードを使った！ - ¥{}".green()),
            (Language::En, "purchase_refused") => "Purchase of {} refused: the total would overflow.".red().to_string(),
            (Language::Ja, "purchase_refused") => "{}個の購入は拒否されました: 合計が上限を超えます。".red().to_string(),

            (Language::En, "shortfall") => "Not enough {}: {} more needed. Please buy more.".red().to_string(),
            (Language::Ja, "shortfall") => "{}が{}個足りません。課金してください。".red().to_string(),

            (Language::En, "stones_left") => "{} left: {} -> {}".to_string(),
            (Language::Ja, "stones_left") => "残{}: {}個 -> {}個".to_string(),

            (Language::En, "trials") => "\nTrials: {}".to_string(),
            (Language::Ja, "trials") => "\n試行回数: {}".to_string(),

            (Language::En, "no_trials") => "No trial!".yellow().to_string(),
            (Language::Ja, "no_trials") => "試行回数が0です。".yellow().to_string(),

            (Language::En, "invalid_table") => "Gacha rates do not add up to 100% ({}%). Nothing was drawn.".red().to_string(),
            (Language::Ja, "invalid_table") => "ガチャの確率が100%になりません ({}%)。抽選を中止しました。".red().to_string(),

            (Language::En, "rare_relief") => format!("{}", "10-summon relief: 4★ re-draw!".cyan()),
            (Language::Ja, "rare_relief") => format!("{}", "10連救済措置：☆4再抽選!".cyan()),

            (Language::En, "servant_relief") => format!("{}", "10-summon relief: 3★ servant re-draw!".cyan()),
            (Language::Ja, "servant_relief") => format!("{}", "10連救済措置：☆3鯖再抽選!".cyan()),

            (Language::En, "relief_skipped") => "Relief skipped, its table is invalid ({}%).".red().to_string(),
            (Language::Ja, "relief_skipped") => "救済テーブルが不正なため再抽選をスキップしました ({}%)。".red().to_string(),

            (Language::En, "fallthrough") => "Could not pick gacha contents! (value {})".red().to_string(),
            (Language::Ja, "fallthrough") => "ガチャ内容を決定できませんでした。(値 {})".red().to_string(),

            (Language::En, "pick_up_changed") => "Pick-up banner changed to \"{}\".".to_string(),
            (Language::Ja, "pick_up_changed") => "ピックアップ状態が \"{}\" に変更されました。".to_string(),

            (Language::En, "reset") => "Resetting user state.".yellow().to_string(),
            (Language::Ja, "reset") => "ユーザ状態をリセットします。".yellow().to_string(),

            (Language::En, "unknown_command") => "Unknown command.".red().to_string(),
            (Language::Ja, "unknown_command") => "コマンドが設定されていません。".red().to_string(),

            (Language::En, "invalid_number") => "Invalid number, using the default.".red().to_string(),
            (Language::Ja, "invalid_number") => "数値が不正です。既定値を使います。".red().to_string(),

            (Language::En, "capped") => "Count capped at {}.".red().to_string(),
            (Language::Ja, "capped") => "回数を{}に制限しました。".red().to_string(),

            (Language::En, "exit_msg") => "Exiting. Goodbye!".to_string(),
            (Language::Ja, "exit_msg") => "終了します。".to_string(),

            // === Results ===
            (Language::En, "batch_header") => "{}-summon result (used {}: {}, fee: ¥{})".to_string(),
            (Language::Ja, "batch_header") => "{}連ガチャ結果 (消費{}: {}個, 金額: {}円)".to_string(),

            (Language::En, "session_header") => "Session total (used {}: {}, fee: ¥{})".to_string(),
            (Language::Ja, "session_header") => "ガチャ結果総まとめ (消費{}: {}個, 金額: {}円)".to_string(),

            (Language::En, "table_header") => "Active rates:".to_string(),
            (Language::Ja, "table_header") => "現在の排出確率:".to_string(),

            // === Help ===
            (Language::En, "help") => [
                "[help]",
                "A summon (gacha) simulator.",
                "Commands buy stones and draw summons.",
                "Add a space and a number after a command to set the stone count or draw count.",
                "An empty line (just Enter) draws a quick 10-summon.",
                "p toggles the pick-up banner; 'p on' / 'p off' set it.",
                "Try c + Enter, then g + Enter.",
            ].join("\n"),
            (Language::Ja, "help") => [
                "[help]",
                "ガチャシミュレータです。",
                "コマンドで課金，ガチャを引くことができます。",
                "コマンドの後にスペースと数値入力で，購入石数，ガチャ数を指定できます。",
                "コマンド無記入+Enterで10連ガチャをすぐに引くことができます。",
                "p でピックアップを切り替えます。'p on' / 'p off' でも指定できます。",
                "c+Enterの後に，g+Enterをしてみてください。",
            ].join("\n"),

            // === Batch simulation ===
            (Language::En, "sim_header") => "Simulations: {}, summons per run: {}".to_string(),
            (Language::Ja, "sim_header") => "シミュレーション回数: {}, 1回あたりの召喚数: {}".to_string(),

            (Language::En, "sim_relief") => "Relief fired: 4★ {} | servant {}".to_string(),
            (Language::Ja, "sim_relief") => "救済発動: ☆4 {} | 鯖 {}".to_string(),

            (Language::En, "sim_time") => "Time taken: {} | {} summons/sec".to_string(),
            (Language::Ja, "sim_time") => "所要時間: {} | {} 回/秒".to_string(),

            // Default fallback
            (_, k) => k.to_string(),
        }
    }
}
