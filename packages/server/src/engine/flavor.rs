//! Flavor text for eliminations. Each pool entry is addressed by a log key
//! of the form `{pool}.{index}` so clients can localize it.

use rand::Rng;

use crate::models::role::Role;

pub trait VariantPicker: Send + Sync {
    fn pick(&self, len: usize) -> usize;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPicker;

impl VariantPicker for RandomPicker {
    fn pick(&self, len: usize) -> usize {
        rand::thread_rng().gen_range(0..len)
    }
}

#[derive(Debug, Clone, Copy)]
pub struct FixedPicker(pub usize);

impl VariantPicker for FixedPicker {
    fn pick(&self, len: usize) -> usize {
        self.0 % len
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlavorPool {
    MafiaKill,
    LynchMafia,
    LynchDoctor,
    LynchVillager,
}

impl FlavorPool {
    pub fn for_lynched(role: Option<Role>) -> Self {
        match role {
            Some(Role::Mafia) => FlavorPool::LynchMafia,
            Some(Role::Doctor) => FlavorPool::LynchDoctor,
            _ => FlavorPool::LynchVillager,
        }
    }

    pub fn key_prefix(&self) -> &'static str {
        match self {
            FlavorPool::MafiaKill => "mafiaKill",
            FlavorPool::LynchMafia => "lynchMafia",
            FlavorPool::LynchDoctor => "lynchDoctor",
            FlavorPool::LynchVillager => "lynchVillager",
        }
    }

    pub fn templates(&self) -> &'static [&'static str] {
        match self {
            FlavorPool::MafiaKill => MAFIA_KILL,
            FlavorPool::LynchMafia => LYNCH_MAFIA,
            FlavorPool::LynchDoctor => LYNCH_DOCTOR,
            FlavorPool::LynchVillager => LYNCH_VILLAGER,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Flavor {
    pub key: String,
    pub message: String,
}

pub fn render(pool: FlavorPool, picker: &dyn VariantPicker, nickname: &str) -> Flavor {
    let templates = pool.templates();
    let index = picker.pick(templates.len()).min(templates.len() - 1);
    Flavor {
        key: format!("{}.{}", pool.key_prefix(), index),
        message: templates[index].replace("{nickname}", nickname),
    }
}

const MAFIA_KILL: &[&str] = &[
    "🔫 [Mafia Kill] \"{nickname}\" vanished after a short conversation behind closed doors. 🚪",
    "🔫 [Mafia Kill] \"{nickname}\" signed a contract they definitely didn't read. 📝💀",
    "🔫 [Mafia Kill] \"{nickname}\" was promoted to an example for others. 📉",
    "🔫 [Mafia Kill] \"{nickname}\" misunderstood what 'family meeting' meant. 👨‍👩‍👧‍👦",
    "🔫 [Mafia Kill] \"{nickname}\" is now part of an ongoing investigation. 🕵️‍♂️",
    "🔫 [Mafia Kill] \"{nickname}\" missed the memo about staying quiet. 🤐",
    "🔫 [Mafia Kill] \"{nickname}\" won the argument. Lost everything else. 🥀",
    "🔫 [Mafia Kill] \"{nickname}\" was removed from the payroll. Permanently. 💼",
    "🔫 [Mafia Kill] \"{nickname}\" learned too much, too fast. 🧠",
    "🔫 [Mafia Kill] \"{nickname}\" took responsibility. The mafia took care of the rest. 🪦",
    "🔫 [Mafia Kill] \"{nickname}\" won't be causing any more problems. ✔️",
    "🔫 [Mafia Kill] \"{nickname}\" is no longer accepting messages. 📵",
    "🔫 [Mafia Kill] \"{nickname}\" reached the end of their character arc. 🎭",
    "🔫 [Mafia Kill] \"{nickname}\" was last seen nodding nervously. Then silence. 😶",
    "🔫 [Mafia Kill] \"{nickname}\" failed the loyalty test. ❌",
    "🔫 [Mafia Kill] \"{nickname}\" got edited out of the story. ✂️",
    "🔫 [Mafia Kill] \"{nickname}\" found out why we don't ask twice. 🔫",
    "🔫 [Mafia Kill] \"{nickname}\" is now a cautionary tale. 📖",
    "🔫 [Mafia Kill] \"{nickname}\" took a shortcut. It was final. 🛣️",
    "🔫 [Mafia Kill] \"{nickname}\" has been dealt with. 🧤",
];

const LYNCH_VILLAGER: &[&str] = &[
    "⚖️ [Lynched] \"{nickname}\" was innocent. The village will pretend this never happened. 😬",
    "⚖️ [Lynched] \"{nickname}\" was NOT the mafia. Awkward silence follows… 😶",
    "⚖️ [Lynched] \"{nickname}\" died for democracy. Democracy feels bad now. 🗳️💀",
    "⚖️ [Lynched] \"{nickname}\" was just vibing. The villagers chose violence. 😐",
    "⚖️ [Lynched] \"{nickname}\" trusted the process. That was the mistake. 🤡",
    "⚖️ [Lynched] \"{nickname}\" wasn't the mafia. Whoops. 😅",
    "⚖️ [Lynched] \"{nickname}\" learned the village has trust issues. 🚩",
    "⚖️ [Lynched] \"{nickname}\" was sacrificed to poor logic and loud voices. 📉",
    "⚖️ [Lynched] \"{nickname}\" got voted out by vibes alone. 🎭",
    "⚖️ [Lynched] \"{nickname}\" was the wrong choice. The mafia approves. 👏",
    "⚖️ [Lynched] \"{nickname}\" died so everyone could say \"my bad\" tomorrow. 🙃",
    "⚖️ [Lynched] \"{nickname}\" was innocent. The village has regrets. Briefly. 😔",
    "⚖️ [Lynched] \"{nickname}\" trusted their neighbors. Big mistake. 🏘️",
    "⚖️ [Lynched] \"{nickname}\" got caught in the classic villagers L. 📉",
    "⚖️ [Lynched] \"{nickname}\" was the wrong answer. Final answer. ❌",
    "⚖️ [Lynched] \"{nickname}\" paid the price for bad group chat decisions. 📱",
    "⚖️ [Lynched] \"{nickname}\" wasn't suspicious. Just unlucky. 🍀",
    "⚖️ [Lynched] \"{nickname}\" died to prove the mafia didn't even need to try. 😈",
];

const LYNCH_MAFIA: &[&str] = &[
    "⚖️ [Lynched] \"{nickname}\" was exposed! The mafia's plan crumbles. 🎯",
    "⚖️ [Lynched] \"{nickname}\" got caught red-handed. Justice served! ⚖️",
    "⚖️ [Lynched] \"{nickname}\" thought they were slick. The village wasn't having it. 😎",
    "⚖️ [Lynched] \"{nickname}\" tried to blend in. Failed spectacularly. 🎭",
    "⚖️ [Lynched] \"{nickname}\" was the mafia! The villagers got it right this time. ✅",
    "⚖️ [Lynched] \"{nickname}\" got outsmarted by the village. Skill issue. 🧠",
    "⚖️ [Lynched] \"{nickname}\" was too sus. The village had enough. 🚨",
    "⚖️ [Lynched] \"{nickname}\" made one mistake too many. Game over. 🎮",
    "⚖️ [Lynched] \"{nickname}\" was the mafia all along! The village celebrates. 🎉",
    "⚖️ [Lynched] \"{nickname}\" got caught. The mafia's numbers are dwindling. 📉",
    "⚖️ [Lynched] \"{nickname}\" slipped up. The village caught them. 🕵️",
    "⚖️ [Lynched] \"{nickname}\" was playing both sides. The village chose a side. ⚔️",
    "⚖️ [Lynched] \"{nickname}\" thought they were safe. They were wrong. ❌",
    "⚖️ [Lynched] \"{nickname}\" got voted out for being too obvious. Oops. 😬",
    "⚖️ [Lynched] \"{nickname}\" was the mafia! The village's detective work paid off. 🔍",
];

const LYNCH_DOCTOR: &[&str] = &[
    "⚖️ [Lynched] \"{nickname}\" was the doctor! The village just lost their only protection. 😱",
    "⚖️ [Lynched] \"{nickname}\" was trying to save lives. The village didn't care. 💔",
    "⚖️ [Lynched] \"{nickname}\" was the doctor! Who's going to save you now? 🏥",
    "⚖️ [Lynched] \"{nickname}\" was healing people. The village lynched their healer. 🤦",
    "⚖️ [Lynched] \"{nickname}\" was the doctor! The mafia is celebrating. 🎉",
    "⚖️ [Lynched] \"{nickname}\" saved lives every night. The village killed them anyway. 😢",
    "⚖️ [Lynched] \"{nickname}\" was the doctor! This is why we can't have nice things. 😤",
    "⚖️ [Lynched] \"{nickname}\" was protecting the innocent. The village didn't notice. 🛡️",
    "⚖️ [Lynched] \"{nickname}\" was the doctor! The village just made the mafia's job easier. 😈",
    "⚖️ [Lynched] \"{nickname}\" was healing people. The village chose violence instead. ⚔️",
    "⚖️ [Lynched] \"{nickname}\" was the doctor! The village has no one to blame but themselves. 🤷",
    "⚖️ [Lynched] \"{nickname}\" was saving lives. The village voted to end theirs. 💉",
    "⚖️ [Lynched] \"{nickname}\" was the doctor! The mafia sends their thanks. 🙏",
    "⚖️ [Lynched] \"{nickname}\" was the village's only hope. Now it's gone. 🌑",
    "⚖️ [Lynched] \"{nickname}\" was the doctor! The village just threw away their lifeline. 🚑",
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_pool_has_at_least_fourteen_variants() {
        for pool in [
            FlavorPool::MafiaKill,
            FlavorPool::LynchMafia,
            FlavorPool::LynchDoctor,
            FlavorPool::LynchVillager,
        ] {
            assert!(pool.templates().len() >= 14, "{:?} is too small", pool);
            assert!(pool.templates().iter().all(|t| t.contains("{nickname}")));
        }
    }

    #[test]
    fn render_tags_message_with_pool_and_index() {
        let flavor = render(FlavorPool::LynchDoctor, &FixedPicker(3), "Alice");
        assert_eq!(flavor.key, "lynchDoctor.3");
        assert!(flavor.message.contains("\"Alice\""));
        assert!(!flavor.message.contains("{nickname}"));
    }

    #[test]
    fn fixed_picker_wraps_out_of_range_index() {
        let flavor = render(FlavorPool::MafiaKill, &FixedPicker(21), "Bob");
        assert_eq!(flavor.key, "mafiaKill.1");
    }

    #[test]
    fn random_picker_stays_in_range() {
        let picker = RandomPicker;
        for _ in 0..200 {
            assert!(picker.pick(15) < 15);
        }
    }

    #[test]
    fn lynch_pool_follows_role() {
        assert_eq!(FlavorPool::for_lynched(Some(Role::Mafia)), FlavorPool::LynchMafia);
        assert_eq!(FlavorPool::for_lynched(Some(Role::Doctor)), FlavorPool::LynchDoctor);
        assert_eq!(FlavorPool::for_lynched(Some(Role::Villager)), FlavorPool::LynchVillager);
        assert_eq!(FlavorPool::for_lynched(None), FlavorPool::LynchVillager);
    }
}
