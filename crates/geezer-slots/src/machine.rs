//! The slot machine: weighted tiers, a 3x3 grid, and its chat rendering.
//!
//! One tier is drawn per pull and fills the winning row. The other two rows
//! are six filler draws from the same distribution, rerolled whenever a draw
//! would make three identical fillers in a row, so only the winning row ever
//! shows a line.

use rand::Rng;
use rand::distributions::{Distribution, Standard};

/// Tickets a pull costs.
pub const PULL_COST: u64 = 1;

const FILLERS: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Tier {
    VeryCommon,
    Common,
    Uncommon,
    Rare,
    VeryRare,
    Epic,
    Legendary,
    Jackpot,
}

impl Tier {
    pub const ALL: [Tier; 8] = [
        Tier::VeryCommon,
        Tier::Common,
        Tier::Uncommon,
        Tier::Rare,
        Tier::VeryRare,
        Tier::Epic,
        Tier::Legendary,
        Tier::Jackpot,
    ];

    /// Sum of all weights; a tier's probability is `weight / TOTAL_WEIGHT`.
    pub const TOTAL_WEIGHT: u32 = total_weight();

    pub const fn weight(self) -> u32 {
        match self {
            Self::VeryCommon => 100,
            Self::Common => 95,
            Self::Uncommon => 75,
            Self::Rare => 60,
            Self::VeryRare => 50,
            Self::Epic => 30,
            Self::Legendary => 10,
            Self::Jackpot => 1,
        }
    }

    /// Units credited when this tier fills the winning row.
    pub const fn payout(self) -> u64 {
        match self {
            Self::VeryCommon => 0,
            Self::Common => 25,
            Self::Uncommon => 100,
            Self::Rare => 250,
            Self::VeryRare => 500,
            Self::Epic => 1000,
            Self::Legendary => 2500,
            Self::Jackpot => 5000,
        }
    }

    const fn index(self) -> usize {
        self as usize
    }
}

const fn total_weight() -> u32 {
    let mut total = 0;
    let mut i = 0;
    while i < Tier::ALL.len() {
        total += Tier::ALL[i].weight();
        i += 1;
    }
    total
}

impl Distribution<Tier> for Standard {
    fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Tier {
        let mut roll = rng.gen_range(0..Tier::TOTAL_WEIGHT);
        for tier in Tier::ALL {
            if roll < tier.weight() {
                return tier;
            }
            roll -= tier.weight();
        }
        // roll < TOTAL_WEIGHT, so the loop always returns
        Tier::VeryCommon
    }
}

/// One pull of the lever.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spin {
    pub tier: Tier,
    /// 0, 1 or 2, top to bottom
    pub winning_row: usize,
    /// The two non-winning rows, top to bottom
    pub filler_rows: [[Tier; 3]; 2],
}

impl Spin {
    pub fn roll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let tier: Tier = rng.sample(Standard);
        let winning_row = rng.gen_range(0..=2);

        let mut fillers: Vec<Tier> = Vec::with_capacity(FILLERS);
        while fillers.len() < FILLERS {
            let candidate: Tier = rng.sample(Standard);
            if let [.., a, b] = fillers.as_slice()
                && *a == candidate
                && *b == candidate
            {
                continue;
            }
            fillers.push(candidate);
        }

        let f = &fillers;
        Self {
            tier,
            winning_row,
            filler_rows: [[f[0], f[1], f[2]], [f[3], f[4], f[5]]],
        }
    }

    pub fn payout(&self) -> u64 {
        self.tier.payout()
    }

    /// The full grid, top to bottom.
    pub fn rows(&self) -> [[Tier; 3]; 3] {
        let line = [self.tier; 3];
        let [a, b] = self.filler_rows;
        match self.winning_row {
            0 => [line, a, b],
            1 => [a, line, b],
            _ => [a, b, line],
        }
    }

    /// Chat message: three `|x|y|z|` rows, then the reaction and the payout.
    pub fn render(&self, emoji: &EmojiSet) -> String {
        let mut out = String::new();
        for (i, row) in self.rows().iter().enumerate() {
            out.push('|');
            for &tier in row {
                if i == self.winning_row {
                    out.push_str(emoji.line(tier));
                } else {
                    out.push_str(emoji.reel(tier));
                }
                out.push('|');
            }
            out.push('\n');
        }
        out.push_str(&format!(
            "{}, Won {} Units!",
            emoji.reaction(self.tier),
            self.payout()
        ));
        out
    }
}

/// Emoji shown for each tier, indexed in [`Tier::ALL`] order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmojiSet {
    /// Symbols on the reels
    pub reels: [String; 8],
    /// Replaces the jackpot symbol when it fills the winning row
    pub jackpot_line: String,
    /// Reaction under the grid, keyed by the winning tier
    pub reactions: [String; 8],
}

impl EmojiSet {
    pub fn reel(&self, tier: Tier) -> &str {
        &self.reels[tier.index()]
    }

    pub fn line(&self, tier: Tier) -> &str {
        match tier {
            Tier::Jackpot => &self.jackpot_line,
            _ => self.reel(tier),
        }
    }

    pub fn reaction(&self, tier: Tier) -> &str {
        &self.reactions[tier.index()]
    }
}

impl Default for EmojiSet {
    /// The home guild's custom emoji.
    fn default() -> Self {
        let champ = "<:kidchamp:251469271077486602>";
        Self {
            reels: [
                "<:thisdog:672248379023163392>",
                "<:delfruit:951979442736074802>",
                "<:bigface:269629753647038464>",
                "<:miku:548647780500111390>",
                "<:tagfacehd:476888451132686361>",
                "<:patsball:378972419685351441>",
                "<:fruitpride:562501619615268884>",
                "<:mayumushi:951906103271235654>",
            ]
            .map(str::to_owned),
            jackpot_line: "<a:mayumushi_ani:951798762567766036>".to_owned(),
            reactions: [
                "<:kidangry:269629941090484225>",
                "<:kidsleeper:269629879949983758>",
                "<:kidunamused:269629805111148554>",
                "<:kidthinking:269629915882586122>",
                champ,
                champ,
                champ,
                "<:kidd:808737149507076147>",
            ]
            .map(str::to_owned),
        }
    }
}
