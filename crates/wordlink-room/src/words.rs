//! The relatedness oracle: a static category table.
//!
//! Two words are related when they land in the same category. Lookup walks
//! the table in order and the first hit wins, so a word listed under two
//! categories (`"tropical"`, `"habitat"`, `"rainbow"`, ...) belongs to the
//! earlier one.

use rand::Rng;
use rand::seq::IndexedRandom;

/// One topical category.
#[derive(Debug)]
pub struct Category {
    pub name: &'static str,
    /// Primary members. Starting words are drawn from here.
    pub words: &'static [&'static str],
    /// Looser associations that still count as members.
    pub common_words: &'static [&'static str],
}

impl Category {
    /// Whether an already lower-cased word belongs to this category.
    fn contains(&self, word: &str) -> bool {
        self.words.contains(&word) || self.common_words.contains(&word)
    }
}

/// Used only if the table is ever emptied.
const FALLBACK_START_WORD: &str = "tree";

/// The category table, in lookup order.
pub static CATEGORIES: &[Category] = &[
    Category {
        name: "nature",
        words: &[
            "tree", "leaf", "forest", "wood", "plant", "flower", "garden", "bush", "grass", "vine",
            "meadow", "jungle", "mountain", "river", "lake", "ocean", "beach", "island", "valley",
            "cliff", "waterfall", "brook", "stream", "desert", "volcano", "glacier", "canyon",
            "peak", "cave", "reef", "oasis", "marsh", "geyser", "delta", "rainforest", "savanna",
            "tundra", "prairie", "lagoon", "plateau", "fjord",
        ],
        common_words: &[
            "green", "grow", "nature", "outdoor", "wild", "bloom", "seed", "root", "stem",
            "ecosystem", "environment", "landscape", "habitat", "wilderness", "tropical", "lush",
            "fertile", "organic", "natural", "verdant", "abundant", "pristine", "serene",
            "untamed", "diverse",
        ],
    },
    Category {
        name: "weather",
        words: &[
            "rain", "sun", "cloud", "storm", "wind", "snow", "fog", "thunder", "lightning", "hail",
            "blizzard", "hurricane", "tornado", "breeze", "drizzle", "frost", "mist", "rainbow",
            "sleet", "sunshine", "cyclone", "drought", "flood", "shower", "typhoon", "avalanche",
            "monsoon", "tsunami", "whirlwind", "downpour", "cloudburst",
        ],
        common_words: &[
            "weather", "climate", "temperature", "forecast", "season", "precipitation",
            "humidity", "atmospheric", "meteorology", "barometer", "pressure", "visibility",
            "conditions", "monsoon", "tropical", "arctic", "temperate", "humid", "arid", "stormy",
            "meteorological", "seasonal", "climatic", "turbulent",
        ],
    },
    Category {
        name: "animals",
        words: &[
            "bird", "dog", "cat", "fish", "lion", "tiger", "bear", "elephant", "monkey", "snake",
            "wolf", "fox", "deer", "rabbit", "eagle", "owl", "penguin", "dolphin", "whale",
            "shark", "turtle", "giraffe", "zebra", "panda", "koala", "kangaroo", "octopus",
            "butterfly", "bee", "squirrel", "raccoon", "moose", "buffalo", "rhinoceros", "leopard",
            "cheetah", "gorilla", "crocodile", "flamingo", "peacock", "jaguar",
        ],
        common_words: &[
            "wild", "pet", "creature", "species", "breed", "animal", "predator", "prey", "mammal",
            "reptile", "amphibian", "vertebrate", "carnivore", "herbivore", "omnivore", "extinct",
            "endangered", "domestic", "feral", "migration", "habitat", "ecosystem", "nocturnal",
            "diurnal", "aquatic",
        ],
    },
    Category {
        name: "colors",
        words: &[
            "red", "blue", "green", "yellow", "purple", "orange", "white", "black", "pink",
            "brown", "gray", "violet", "indigo", "maroon", "turquoise", "cyan", "magenta", "gold",
            "silver", "bronze", "beige", "crimson", "scarlet", "navy", "emerald", "ruby",
            "sapphire", "jade", "amber", "ivory", "burgundy", "mauve", "coral", "teal", "khaki",
            "lavender", "olive", "orchid", "periwinkle", "plum",
        ],
        common_words: &[
            "color", "shade", "bright", "dark", "light", "colorful", "tint", "hue", "primary",
            "secondary", "tertiary", "pastel", "neon", "vibrant", "vivid", "muted", "saturated",
            "iridescent", "metallic", "rainbow", "spectrum", "pigment", "tone", "gradient",
            "chromatic",
        ],
    },
    Category {
        name: "emotions",
        words: &[
            "happy", "sad", "angry", "excited", "scared", "surprised", "calm", "nervous", "proud",
            "lonely", "joyful", "anxious", "peaceful", "grateful", "frustrated", "worried",
            "content", "hopeful", "disappointed", "enthusiastic", "confused", "confident", "shy",
            "jealous", "curious", "bored", "amused", "delighted", "stressed", "relaxed",
            "overwhelmed", "ecstatic", "melancholy", "nostalgic",
        ],
        common_words: &[
            "feeling", "emotion", "mood", "expression", "emotional", "feel", "sentiment",
            "attitude", "disposition", "temperament", "state", "mindset", "spirits", "demeanor",
            "passion", "sensation", "consciousness", "awareness", "perception", "reaction",
            "empathy", "compassion", "sensitivity", "intuition", "psyche",
        ],
    },
];

/// Returns the first category containing `word`, ignoring case.
pub fn category_of(word: &str) -> Option<&'static Category> {
    let word = word.trim().to_lowercase();
    CATEGORIES.iter().find(|c| c.contains(&word))
}

/// Whether two words share a category. A word outside the table is related
/// to nothing, itself included.
pub fn related(a: &str, b: &str) -> bool {
    match (category_of(a), category_of(b)) {
        (Some(ca), Some(cb)) => std::ptr::eq(ca, cb),
        _ => false,
    }
}

/// Picks a random category, then a random primary word from it.
pub fn random_start_word<R: Rng + ?Sized>(rng: &mut R) -> &'static str {
    CATEGORIES
        .choose(rng)
        .and_then(|category| category.words.choose(rng))
        .copied()
        .unwrap_or(FALLBACK_START_WORD)
}
