//! Application state

use rand::rngs::StdRng;
use rand::SeedableRng;
use stat_engine::prelude::*;
use stat_engine::DamageRange;
use std::sync::Arc;

const OWNER_LEVEL: u8 = 10;
const PET_ID: &str = "spirit_wolf";
const PET_SPECIES: &str = "spirit_wolf";
const CREATURE: &str = "forest_wolf";
const STAT_STEP: f64 = 10.0;
const RATING_STEP: i32 = 50;
const MAX_MESSAGES: usize = 200;

/// Forms cycled by the form key, `None` first
const FORMS: &[Option<&str>] = &[None, Some("cat"), Some("bear"), Some("moonkin")];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Owner,
    Dependent,
    Creature,
    Log,
    Help,
}

impl Tab {
    pub fn all() -> &'static [Tab] {
        &[Tab::Owner, Tab::Dependent, Tab::Creature, Tab::Log, Tab::Help]
    }

    pub fn name(&self) -> &'static str {
        match self {
            Tab::Owner => "Owner",
            Tab::Dependent => "Pet",
            Tab::Creature => "Creature",
            Tab::Log => "Log",
            Tab::Help => "Help",
        }
    }
}

/// Entity the mutation keys act on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Owner,
    Dependent,
    Creature,
}

pub struct App {
    pub current_tab: Tab,
    pub owner: IndependentActor,
    pub creature: AutonomousActor,
    /// Every field change the owner published
    pub publish_log: RecordingPublisher,
    pub messages: Vec<String>,
    pub rng: StdRng,
    pub selected_stat: usize,
    pub selected_rating: usize,
    pub form_index: usize,
    pub aura_active: [bool; 3],
    pub scroll: usize,
}

impl App {
    pub fn new() -> Self {
        Self::with_tables(Arc::new(StatTables::defaults()))
    }

    pub fn with_tables(tables: Arc<StatTables>) -> Self {
        let mut owner = IndependentActor::new("owner", ClassId::Druid, OWNER_LEVEL, Arc::clone(&tables));
        owner.set_weapon(WeaponAttackType::MainHand, Some(Weapon::new(20.0, 35.0, 2400)));
        owner.summon(PET_ID, &PetSpeciesId::from(PET_SPECIES));

        let publish_log = RecordingPublisher::new();
        owner.core_mut().attach_sink(Box::new(publish_log.clone()));

        let creature = AutonomousActor::new("creature", &CreatureId::from(CREATURE), OWNER_LEVEL, tables);

        App {
            current_tab: Tab::Owner,
            owner,
            creature,
            publish_log,
            messages: vec!["Spawned owner, pet and creature.".to_string()],
            rng: StdRng::from_entropy(),
            selected_stat: 0,
            selected_rating: 0,
            form_index: 0,
            aura_active: [false; 3],
            scroll: 0,
        }
    }

    pub fn next_tab(&mut self) {
        let tabs = Tab::all();
        let current = tabs.iter().position(|t| *t == self.current_tab).unwrap_or(0);
        self.current_tab = tabs[(current + 1) % tabs.len()];
        self.scroll = 0;
    }

    pub fn prev_tab(&mut self) {
        let tabs = Tab::all();
        let current = tabs.iter().position(|t| *t == self.current_tab).unwrap_or(0);
        self.current_tab = tabs[(current + tabs.len() - 1) % tabs.len()];
        self.scroll = 0;
    }

    pub fn set_tab(&mut self, index: usize) {
        if let Some(tab) = Tab::all().get(index) {
            self.current_tab = *tab;
            self.scroll = 0;
        }
    }

    pub fn on_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }

    pub fn on_down(&mut self) {
        self.scroll += 1;
    }

    /// The log tab mutates the owner
    pub fn target(&self) -> Target {
        match self.current_tab {
            Tab::Dependent => Target::Dependent,
            Tab::Creature => Target::Creature,
            _ => Target::Owner,
        }
    }

    pub fn target_host(&self) -> Option<&dyn AttributeHost> {
        match self.target() {
            Target::Owner => Some(&self.owner),
            Target::Dependent => self.pet().map(|d| d as &dyn AttributeHost),
            Target::Creature => Some(&self.creature),
        }
    }

    fn target_mut(&mut self) -> Option<&mut dyn Recalculate> {
        match self.target() {
            Target::Owner => Some(&mut self.owner),
            Target::Dependent => self
                .owner
                .dependent_mut(PET_ID)
                .map(|d| d as &mut dyn Recalculate),
            Target::Creature => Some(&mut self.creature),
        }
    }

    pub fn pet(&self) -> Option<&DependentActor> {
        self.owner.dependents().iter().find(|d| d.core().id == PET_ID)
    }

    pub fn selected_stat(&self) -> Stat {
        Stat::all()[self.selected_stat % Stat::all().len()]
    }

    pub fn selected_rating(&self) -> CombatRating {
        CombatRating::all()[self.selected_rating % CombatRating::all().len()]
    }

    pub fn current_form(&self) -> Option<&'static str> {
        FORMS[self.form_index % FORMS.len()]
    }

    pub fn cycle_stat(&mut self) {
        self.selected_stat = (self.selected_stat + 1) % Stat::all().len();
    }

    pub fn cycle_rating(&mut self) {
        self.selected_rating = (self.selected_rating + 1) % CombatRating::all().len();
    }

    /// Add or remove a flat amount of the selected stat on the target
    pub fn change_stat(&mut self, apply: bool) {
        let stat = self.selected_stat();
        let Some(host) = self.target_mut() else {
            self.log("No pet to modify.".to_string());
            return;
        };
        let id = host.core().id.clone();
        match host.handle_stat_modifier(UnitMod::Stat(stat), ModifierSlot::TotalFlat, STAT_STEP, apply) {
            Some(report) => self.log(format!(
                "{} {:?} {}{} ({} steps)",
                id,
                stat,
                if apply { "+" } else { "-" },
                STAT_STEP,
                report.steps.len()
            )),
            None => self.log(format!("{} has no {:?}", id, stat)),
        }
    }

    /// Ratings only exist on the owner
    pub fn change_rating(&mut self, apply: bool) {
        let rating = self.selected_rating();
        let report = self.owner.apply_rating(rating, RATING_STEP, apply);
        let amount = self.owner.core().ratings.amount(rating);
        self.log(format!(
            "owner rating {:?} now {} ({} steps)",
            rating,
            amount,
            report.steps.len()
        ));
    }

    /// Toggle a +5% crit aura on the target
    pub fn toggle_aura(&mut self) {
        let slot = self.target() as usize;
        let effect = AuraEffect::new(AuraType::ModCritPct, 5);
        let active = self.aura_active[slot];
        let Some(host) = self.target_mut() else {
            self.log("No pet to modify.".to_string());
            return;
        };
        let id = host.core().id.clone();
        if active {
            host.remove_aura(&effect);
        } else {
            host.add_aura(effect);
        }
        self.aura_active[slot] = !active;
        self.log(format!(
            "{} crit aura {}",
            id,
            if active { "removed" } else { "applied" }
        ));
    }

    pub fn cycle_form(&mut self) {
        self.form_index = (self.form_index + 1) % FORMS.len();
        let form = self.current_form();
        let report = self.owner.set_form(form.map(FormId::from));
        self.log(format!(
            "owner form {} ({} steps)",
            form.unwrap_or("none"),
            report.steps.len()
        ));
    }

    pub fn toggle_pet(&mut self) {
        if self.owner.dismiss(PET_ID).is_some() {
            self.log("Dismissed pet.".to_string());
        } else {
            self.owner.summon(PET_ID, &PetSpeciesId::from(PET_SPECIES));
            self.aura_active[Target::Dependent as usize] = false;
            self.log("Summoned pet.".to_string());
        }
    }

    pub fn full_pass(&mut self) {
        let Some(host) = self.target_mut() else {
            self.log("No pet to recompute.".to_string());
            return;
        };
        let id = host.core().id.clone();
        let report = host.update_all_stats();
        self.log(format!("{} full pass ({} steps)", id, report.steps.len()));
    }

    /// Roll one main-hand swing of the target
    pub fn roll_swing(&mut self) {
        let Some(host) = self.target_host() else {
            self.log("No pet to swing.".to_string());
            return;
        };
        let id = host.core().id.clone();
        let range = host.core().published().damage_range(WeaponAttackType::MainHand);
        if range == DamageRange::ZERO {
            self.log(format!("{} has no main-hand damage", id));
            return;
        }
        let hit = range.roll(&mut self.rng);
        self.log(format!(
            "{} swings for {:.0} ({:.0}-{:.0})",
            id, hit, range.min, range.max
        ));
    }

    pub fn clear_log(&mut self) {
        self.publish_log.clear();
        self.messages.clear();
        self.scroll = 0;
    }

    fn log(&mut self, message: String) {
        self.messages.push(message);
        if self.messages.len() > MAX_MESSAGES {
            self.messages.remove(0);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawn_has_pet_and_creature() {
        let app = App::new();
        assert!(app.pet().is_some());
        assert!(app.creature.core().published().get(UnitField::MaxHealth) > 0.0);
    }

    #[test]
    fn test_stat_change_reaches_publish_log() {
        let mut app = App::new();
        app.publish_log.clear();
        app.change_stat(true);
        assert!(app
            .publish_log
            .last(UnitField::Stat(Stat::Strength))
            .is_some());
    }

    #[test]
    fn test_aura_toggle_round_trip() {
        let mut app = App::new();
        let before = app.owner.core().published().to_json();
        app.toggle_aura();
        assert_ne!(app.owner.core().published().to_json(), before);
        app.toggle_aura();
        assert_eq!(app.owner.core().published().to_json(), before);
    }

    #[test]
    fn test_pet_tab_without_pet() {
        let mut app = App::new();
        app.toggle_pet();
        assert!(app.pet().is_none());
        app.set_tab(1);
        app.change_stat(true);
        assert_eq!(app.messages.last().map(String::as_str), Some("No pet to modify."));
        app.toggle_pet();
        assert!(app.pet().is_some());
    }

    #[test]
    fn test_form_cycle_wraps() {
        let mut app = App::new();
        for _ in 0..FORMS.len() {
            app.cycle_form();
        }
        assert!(app.owner.form().is_none());
    }
}
