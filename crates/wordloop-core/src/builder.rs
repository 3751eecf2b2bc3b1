//! Daily quiz assembly.
//!
//! Words are selected from due reviews first, then backfilled with recent
//! lookups. Every selected word yields a spelling item; words with synonyms
//! also yield a multiple-choice item. Short selections are padded by cycling
//! spelling items.

use std::collections::HashSet;

use anyhow::Result;
use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use uuid::Uuid;

use crate::model::{ItemKind, QuizItem, WordRecord};
use crate::traits::WordSource;

const SPELL_PROMPT: &str = "Fill in the missing letters:";
const SYNONYM_PROMPT: &str = "Which word is a synonym of the target word?";

/// Most options a choice item can carry; each gets a letter label.
pub const MAX_CHOICE_OPTIONS: usize = 26;

/// Tuning knobs for item generation.
#[derive(Debug, Clone)]
pub struct BuilderConfig {
    /// Target number of options on a choice item, correct answer included.
    pub choice_options: usize,
    /// Random draws from the synonym pool before falling back to pool order.
    pub max_choice_attempts: usize,
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            choice_options: 4,
            max_choice_attempts: 32,
        }
    }
}

/// Assembles quiz items for one user.
pub struct QuizBuilder<'a, S: WordSource + ?Sized> {
    source: &'a S,
    config: BuilderConfig,
}

impl<'a, S: WordSource + ?Sized> QuizBuilder<'a, S> {
    pub fn new(source: &'a S, config: BuilderConfig) -> Self {
        Self { source, config }
    }

    /// Pick up to `count` words: due reviews first, then recent lookups.
    pub async fn select_words(
        &self,
        user_id: &str,
        count: usize,
        today: NaiveDate,
    ) -> Result<Vec<WordRecord>> {
        let mut selected: Vec<WordRecord> = Vec::new();
        let mut selected_ids = HashSet::new();

        for word in self.source.due_reviews(user_id, today, count).await? {
            if selected.len() < count && selected_ids.insert(word.id) {
                selected.push(word);
            }
        }
        let due = selected.len();

        if selected.len() < count {
            let remaining = count - selected.len();
            let recent = self
                .source
                .recent_lookups(user_id, &selected_ids, remaining)
                .await?;
            for word in recent {
                if selected.len() < count && selected_ids.insert(word.id) {
                    selected.push(word);
                }
            }
        }

        tracing::debug!(
            user_id,
            due,
            backfilled = selected.len() - due,
            "selected quiz words"
        );
        Ok(selected)
    }

    /// Select words and turn them into at most `count` items.
    pub async fn build<R: Rng + Send>(
        &self,
        user_id: &str,
        count: usize,
        today: NaiveDate,
        rng: &mut R,
    ) -> Result<Vec<QuizItem>> {
        let words = self.select_words(user_id, count, today).await?;
        Ok(assemble_items(&words, count, &self.config, rng))
    }
}

/// Turn selected words into items, in selection order, capped at `count`.
pub fn assemble_items<R: Rng + ?Sized>(
    words: &[WordRecord],
    count: usize,
    config: &BuilderConfig,
    rng: &mut R,
) -> Vec<QuizItem> {
    let mut items = Vec::new();

    for word in words {
        if items.len() >= count {
            break;
        }
        items.push(spell_item(word));

        if items.len() < count {
            if let Some(item) = choice_item(word, config, rng) {
                items.push(item);
            }
        }
    }

    while items.len() < count && !words.is_empty() {
        let word = &words[items.len() % words.len()];
        items.push(spell_item(word));
    }

    items
}

fn new_item_id() -> String {
    Uuid::new_v4().simple().to_string()
}

/// Hide interior letters, keeping the first and last visible.
///
/// Words of one or two letters become `<first>_`.
pub fn mask_word(word: &str) -> String {
    let chars: Vec<char> = word.chars().collect();
    match chars.as_slice() {
        [] => String::new(),
        [first] | [first, _] => format!("{first}_"),
        [first, middle @ .., last] => {
            let mut masked = String::with_capacity(word.len());
            masked.push(*first);
            masked.extend(std::iter::repeat('_').take(middle.len()));
            masked.push(*last);
            masked
        }
    }
}

/// Spelling item: masked lemma, length hint, lemma as gold answer.
pub fn spell_item(word: &WordRecord) -> QuizItem {
    let length = word.lemma.chars().count();
    let hint = word
        .lemma
        .chars()
        .next()
        .map(|first| format!("Length {length}, starts with '{first}'"));

    QuizItem {
        id: new_item_id(),
        kind: ItemKind::Spell,
        word_id: word.id,
        prompt: format!("{SPELL_PROMPT} {}", mask_word(&word.lemma)),
        hint,
        options: None,
        answer: word.lemma.clone(),
    }
}

fn option_key(option: &str) -> String {
    option.trim().to_lowercase()
}

/// Synonym multiple-choice item, or `None` if the pool cannot supply at
/// least two distinct options.
pub fn choice_item<R: Rng + ?Sized>(
    word: &WordRecord,
    config: &BuilderConfig,
    rng: &mut R,
) -> Option<QuizItem> {
    let pool: Vec<&String> = word
        .synonyms
        .iter()
        .filter(|s| !s.trim().is_empty())
        .collect();

    let distinct = pool
        .iter()
        .map(|s| option_key(s))
        .collect::<HashSet<_>>()
        .len();
    if distinct < 2 {
        return None;
    }
    let target = config.choice_options.min(MAX_CHOICE_OPTIONS).min(distinct).max(2);

    let correct = (*pool.choose(rng)?).clone();
    let mut seen = HashSet::from([option_key(&correct)]);
    let mut options = vec![correct.clone()];

    let mut attempts = 0;
    while options.len() < target && attempts < config.max_choice_attempts {
        attempts += 1;
        if let Some(candidate) = pool.choose(rng) {
            if seen.insert(option_key(candidate)) {
                options.push((*candidate).clone());
            }
        }
    }

    // Unlucky draws: take the rest in pool order.
    for candidate in &pool {
        if options.len() >= target {
            break;
        }
        if seen.insert(option_key(candidate)) {
            options.push((*candidate).clone());
        }
    }

    options.shuffle(rng);

    Some(QuizItem {
        id: new_item_id(),
        kind: ItemKind::Choice,
        word_id: word.id,
        prompt: format!("{SYNONYM_PROMPT}\n(Target: {})", word.lemma),
        hint: None,
        options: Some(options),
        answer: correct,
    })
}
