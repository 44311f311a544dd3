// 🗂️ Session - one state object per module plus the current page
//
// Entering a module starts it fresh, the way a page load does. The
// dashboard has no state of its own.

use crate::config::Config;
use crate::error::{CommandCenterError, Result};
use crate::export::{ExportDocument, Exportable};
use crate::markup::Fragment;
use crate::modules::cost_ticker::{CostTicker, DEFAULT_QUERY};
use crate::modules::data_sovereignty::DataSovereignty;
use crate::modules::fine_tuning::FineTuning;
use crate::modules::guardrails::Guardrails;
use crate::modules::infra_recommender::InfraRecommender;
use crate::modules::model_arena::ModelArena;
use crate::modules::model_lab::{ModelLab, TrainingConfig};
use crate::modules::rag_citations::{RagCitations, SAMPLE_QUESTIONS};
use crate::modules::Run;
use crate::navigation::Module;
use crate::pages;
use chrono::{DateTime, Utc};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::Serialize;
use serde_json::Value;

pub struct Session {
    pub config: Config,
    pub rng: StdRng,
    current: Module,
    pub cost: CostTicker,
    pub guardrails: Guardrails,
    pub rag: RagCitations,
    pub arena: ModelArena,
    pub fine_tuning: FineTuning,
    pub model_lab: ModelLab,
    pub infra: InfraRecommender,
    pub sovereignty: DataSovereignty,
}

impl Session {
    pub fn new(config: Config) -> Self {
        Session::with_rng(config, StdRng::from_entropy())
    }

    /// Deterministic session for tests and `--seed`
    pub fn with_seed(config: Config, seed: u64) -> Self {
        Session::with_rng(config, StdRng::seed_from_u64(seed))
    }

    fn with_rng(config: Config, rng: StdRng) -> Self {
        Session {
            cost: CostTicker::new(&config.cost),
            guardrails: Guardrails::new(),
            rag: RagCitations::new(),
            arena: ModelArena::new(),
            fine_tuning: FineTuning::new(),
            model_lab: ModelLab::new(),
            infra: InfraRecommender::new(),
            sovereignty: DataSovereignty::new(),
            current: Module::Dashboard,
            config,
            rng,
        }
    }

    pub fn current(&self) -> Module {
        self.current
    }

    /// Switch pages. The target module's state starts over; staying on the
    /// same page keeps it.
    pub fn navigate(&mut self, to: Module) {
        if to == self.current {
            return;
        }
        self.reset(to);
        tracing::debug!("navigate {} -> {}", self.current.key(), to.key());
        self.current = to;
    }

    pub fn reset(&mut self, module: Module) {
        match module {
            Module::Dashboard => {}
            Module::CostTicker => self.cost = CostTicker::new(&self.config.cost),
            Module::RagCitations => self.rag = RagCitations::new(),
            Module::Guardrails => self.guardrails = Guardrails::new(),
            Module::ModelArena => self.arena = ModelArena::new(),
            Module::FineTuning => self.fine_tuning = FineTuning::new(),
            Module::ModelLab => self.model_lab = ModelLab::new(),
            Module::InfraRecommender => self.infra = InfraRecommender::new(),
            Module::DataSovereignty => self.sovereignty = DataSovereignty::new(),
        }
    }

    /// Whether the module has an animation in flight
    pub fn is_running(&self, module: Module) -> bool {
        match module {
            Module::Dashboard => false,
            Module::CostTicker => self.cost.is_running(),
            Module::RagCitations => self.rag.is_running(),
            Module::Guardrails => self.guardrails.is_running(),
            Module::ModelArena => self.arena.is_running(),
            Module::FineTuning => self.fine_tuning.is_running(),
            Module::ModelLab => self.model_lab.is_running(),
            Module::InfraRecommender => self.infra.is_running(),
            Module::DataSovereignty => self.sovereignty.is_running(),
        }
    }

    /// Current fragments of a module's page
    pub fn render(&self, module: Module) -> Vec<Fragment> {
        match module {
            Module::Dashboard => pages::dashboard_fragments(),
            Module::CostTicker => self.cost.render(),
            Module::RagCitations => self.rag.render(),
            Module::Guardrails => self.guardrails.render(),
            Module::ModelArena => self.arena.render(),
            Module::FineTuning => self.fine_tuning.render(),
            Module::ModelLab => self.model_lab.render(),
            Module::InfraRecommender => self.infra.render(),
            Module::DataSovereignty => self.sovereignty.render(),
        }
    }

    /// Canned input for the `index`-th demo run of modules that take text
    pub fn sample_input(&self, module: Module, index: usize) -> Option<String> {
        match module {
            Module::CostTicker => Some(DEFAULT_QUERY.to_string()),
            Module::RagCitations => Some(SAMPLE_QUESTIONS[index % SAMPLE_QUESTIONS.len()].to_string()),
            Module::Guardrails => {
                let count = self.guardrails.industry().test_prompts.len().max(1);
                self.guardrails.test_prompt(index % count).ok().map(str::to_string)
            }
            Module::ModelArena => {
                let count = self.arena.industry().prompts.len().max(1);
                self.arena.prompt_text(index % count).ok().map(str::to_string)
            }
            _ => None,
        }
    }

    /// Start a module's main animated operation.
    ///
    /// `input` is the query or prompt for modules that take one; the first
    /// canned sample stands in when it is missing. Model lab trains with the
    /// default configuration.
    pub fn run(&mut self, module: Module, input: Option<&str>, now: DateTime<Utc>) -> Result<Run<Value>> {
        let sample = self.sample_input(module, 0);
        let text = input.or(sample.as_deref()).unwrap_or_default();
        let animation = &self.config.animation;

        tracing::info!("run {}", module.key());
        match module {
            Module::Dashboard => Err(CommandCenterError::invalid("the dashboard has nothing to run")),
            Module::CostTicker => to_json(self.cost.run_comparison(text, animation)?),
            Module::RagCitations => to_json(self.rag.send_query(text, animation)?),
            Module::Guardrails => to_json(self.guardrails.run_test(text, &mut self.rng, animation)?),
            Module::ModelArena => to_json(self.arena.run_comparison(text, &mut self.rng, animation)?),
            Module::FineTuning => to_json(self.fine_tuning.run_comparison(animation)?),
            Module::ModelLab => to_json(self.model_lab.start_training(
                TrainingConfig::default(),
                &mut self.rng,
                animation,
                now,
            )?),
            Module::InfraRecommender => to_json(self.infra.recommend(animation)?),
            Module::DataSovereignty => to_json(self.sovereignty.animate_flow(animation)?),
        }
    }

    fn exportable(&self, module: Module) -> Result<&dyn Exportable> {
        Ok(match module {
            Module::Dashboard => {
                return Err(CommandCenterError::invalid("the dashboard has nothing to export"))
            }
            Module::CostTicker => &self.cost,
            Module::RagCitations => &self.rag,
            Module::Guardrails => &self.guardrails,
            Module::ModelArena => &self.arena,
            Module::FineTuning => &self.fine_tuning,
            Module::ModelLab => &self.model_lab,
            Module::InfraRecommender => &self.infra,
            Module::DataSovereignty => &self.sovereignty,
        })
    }

    pub fn export(&self, module: Module, now: DateTime<Utc>) -> Result<ExportDocument> {
        self.exportable(module)?.export(now)
    }

    /// Every module that can currently export, skipping those that need a run first
    pub fn export_all(&self, now: DateTime<Utc>) -> Vec<(Module, Result<ExportDocument>)> {
        Module::ALL
            .iter()
            .filter(|m| **m != Module::Dashboard)
            .map(|m| (*m, self.export(*m, now)))
            .collect()
    }
}

fn to_json<T: Serialize>(run: Run<T>) -> Result<Run<Value>> {
    let value = serde_json::to_value(&run.outcome)?;
    Ok(run.map(|_| value))
}

impl Default for Session {
    fn default() -> Self {
        Session::new(Config::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn session() -> Session {
        Session::with_seed(Config::default(), 42)
    }

    #[test]
    fn test_starts_on_dashboard() {
        let s = session();
        assert_eq!(s.current(), Module::Dashboard);
        assert!(!s.render(Module::Dashboard).is_empty());
    }

    #[test]
    fn test_navigation_resets_target_module() {
        let mut s = session();
        s.navigate(Module::Guardrails);
        s.guardrails.set_industry("healthcare").unwrap();

        // staying put keeps state
        s.navigate(Module::Guardrails);
        assert_eq!(s.guardrails.industry_key(), "healthcare");

        s.navigate(Module::CostTicker);
        s.navigate(Module::Guardrails);
        assert_eq!(s.guardrails.industry_key(), "general");
    }

    #[test]
    fn test_cost_defaults_follow_config() {
        let mut config = Config::default();
        config.cost.daily_volume = 2_500;
        let mut s = Session::with_seed(config, 1);
        s.cost.set_daily_volume(99);
        s.navigate(Module::CostTicker);
        assert_eq!(s.cost.daily_volume(), 2_500);
    }

    #[test]
    fn test_export_dispatch() {
        let s = session();
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 0, 0, 0).unwrap();
        assert!(s.export(Module::Dashboard, now).is_err());
        assert_eq!(
            s.export(Module::FineTuning, now).unwrap().file_name,
            "fine-tuning-healthcare-2024-03-15.json"
        );

        let all = s.export_all(now);
        assert_eq!(all.len(), 8);
        let ready = all.iter().filter(|(_, doc)| doc.is_ok()).count();
        // model lab and infra recommender need a run first
        assert_eq!(ready, 6);
    }

    #[test]
    fn test_run_dispatch() {
        let now = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
        let mut s = session();
        assert!(s.run(Module::Dashboard, None, now).is_err());

        let run = s.run(Module::RagCitations, None, now).unwrap();
        assert_eq!(run.outcome["citations"][0], "1.1");
        assert!(s.is_running(Module::RagCitations));
        drop(run);
        assert!(!s.is_running(Module::RagCitations));

        // the form is empty
        assert!(matches!(
            s.run(Module::InfraRecommender, None, now),
            Err(CommandCenterError::Incomplete(_))
        ));

        for module in [
            Module::CostTicker,
            Module::Guardrails,
            Module::ModelArena,
            Module::FineTuning,
            Module::ModelLab,
            Module::DataSovereignty,
        ] {
            let run = s.run(module, None, now).unwrap();
            assert!(run.outcome.is_object() || run.outcome.is_number(), "{}", module.key());
        }
    }

    #[test]
    fn test_disabled_animation_runs_in_zero_time() {
        use crate::modules::infra_recommender::Field;
        use crate::typing::script_duration;

        let mut config = Config::default();
        config.animation.enabled = false;
        let mut s = Session::with_seed(config, 3);
        for (field, value) in [
            (Field::Industry, "healthcare"),
            (Field::UseCase, "rag"),
            (Field::Volume, "medium"),
            (Field::Latency, "interactive"),
            (Field::Budget, "growth"),
        ] {
            s.infra.select(field, value).unwrap();
        }

        let now = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
        for module in Module::ALL.into_iter().filter(|m| *m != Module::Dashboard) {
            let (_, script, _ticket) = s.run(module, None, now).unwrap().into_script();
            assert!(script_duration(&script).is_zero(), "{} still animates", module.key());
        }
    }

    #[test]
    fn test_sample_inputs_cycle() {
        let s = session();
        assert_eq!(s.sample_input(Module::RagCitations, 5), s.sample_input(Module::RagCitations, 0));
        assert!(s.sample_input(Module::Guardrails, 0).is_some());
        assert!(s.sample_input(Module::FineTuning, 0).is_none());
    }

    #[test]
    fn test_every_module_renders() {
        let s = session();
        for module in Module::ALL {
            assert!(!s.render(module).is_empty(), "{} rendered nothing", module.key());
            assert!(!s.is_running(module));
        }
    }
}
