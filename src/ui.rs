use anyhow::Result;
use dialoguer::{Input, MultiSelect, Select};
use tracing::debug;

use crate::error::Level;
use crate::fuel::{FuelType, ResultLimit};
use crate::render::{self, ResultsMode, INTRO_TEXT, INTRO_TITLE, THANK_YOU_TEXT};
use crate::session::Step;
use crate::sheets::{Age, Difficulty};
use crate::wizard::{Action, DeliveryForm, DeliveryMethod, FeedbackForm, Notice, SearchForm, Wizard};

/// Interactive terminal front end for the wizard
pub struct Terminal {
    mode: ResultsMode,
    delivery: Option<DeliveryForm>,
}

impl Terminal {
    pub fn new() -> Self {
        Terminal {
            mode: ResultsMode::default(),
            delivery: None,
        }
    }

    /// Prompt for actions until the thank-you step is reached
    pub fn run(&mut self, wizard: &mut Wizard) -> Result<()> {
        loop {
            let action = match wizard.step() {
                Step::Intro => self.intro()?,
                Step::Task1 => self.search()?,
                Step::Task2 => self.results(wizard)?,
                Step::Task3 => self.delivery()?,
                Step::Feedback => self.feedback()?,
                Step::ThankYou => {
                    println!("\n{}", THANK_YOU_TEXT);
                    return Ok(());
                }
            };

            debug!("Dispatching '{}'", action.name());
            match wizard.dispatch(action) {
                Ok(notice) => print_notice(&notice),
                Err(e) => print_notice(&Notice::from(&e)),
            }
        }
    }

    fn intro(&self) -> Result<Action> {
        println!("\n# {}\n\n{}\n", INTRO_TITLE, INTRO_TEXT);
        Select::new()
            .with_prompt("Ready?")
            .items(&["Start Task 1"])
            .default(0)
            .interact()?;
        Ok(Action::Start)
    }

    fn search(&self) -> Result<Action> {
        let location: String = Input::new()
            .with_prompt("Enter city, address or zip code")
            .allow_empty(true)
            .interact_text()?;

        let labels: Vec<String> = FuelType::ALL
            .iter()
            .map(|f| format!("{} ({})", f.code(), f.display_name()))
            .collect();
        let defaults: Vec<bool> = FuelType::ALL
            .iter()
            .map(|f| *f == FuelType::default())
            .collect();
        let picked = MultiSelect::new()
            .with_prompt("Select one or more fuel type")
            .items(&labels)
            .defaults(&defaults)
            .interact()?;
        let fuel_types = picked.into_iter().map(|i| FuelType::ALL[i]).collect();

        let choices = ResultLimit::choices();
        let index = Select::new()
            .with_prompt("Number of stations to retrieve")
            .items(&choices)
            .default(0)
            .interact()?;
        let limit = ResultLimit::new(choices[index])?;

        Ok(Action::Search(SearchForm::new(location, fuel_types, limit)))
    }

    fn results(&mut self, wizard: &Wizard) -> Result<Action> {
        let Some(view) = wizard.results_view() else {
            print_notice(&Notice {
                level: Level::Warning,
                message: "No search results available. Please go back and search again"
                    .to_string(),
            });
            return Ok(Action::BackToSearch);
        };

        loop {
            println!("\n{}", render::render_results(&view, self.mode)?);

            let toggle = match self.mode {
                ResultsMode::Table => "Show Map View",
                ResultsMode::Map => "Show Table View",
            };
            let choice = Select::new()
                .with_prompt("What next?")
                .items(&[
                    toggle,
                    "Back to Search",
                    "Receive Search Results: Continue to Task 3",
                ])
                .default(2)
                .interact()?;

            match choice {
                0 => {
                    self.mode = match self.mode {
                        ResultsMode::Table => ResultsMode::Map,
                        ResultsMode::Map => ResultsMode::Table,
                    }
                }
                1 => return Ok(Action::BackToSearch),
                _ => return Ok(Action::ContinueToDelivery),
            }
        }
    }

    fn delivery(&mut self) -> Result<Action> {
        let form = match self.delivery.take() {
            Some(form) => form,
            None => prompt_delivery()?,
        };

        let choice = Select::new()
            .with_prompt(format!("Deliver by {} to '{}'", form.method, form.contact))
            .items(&["Send Search Results", "Feedback", "Change delivery details"])
            .default(0)
            .interact()?;

        let action = match choice {
            0 => Action::SendResults(form.clone()),
            1 => Action::ContinueToFeedback(form.clone()),
            _ => Action::SendResults(prompt_delivery()?),
        };
        self.delivery = match &action {
            Action::SendResults(sent) => Some(sent.clone()),
            _ => Some(form),
        };
        Ok(action)
    }

    fn feedback(&self) -> Result<Action> {
        println!("\n# Usability Feedback\n");

        let name: String = Input::new()
            .with_prompt("Enter your first and last name")
            .allow_empty(true)
            .interact_text()?;

        let age: u8 = Input::new()
            .with_prompt(format!("Select your age ({}-{})", Age::MIN, Age::MAX))
            .default(Age::MIN)
            .validate_with(|value: &u8| -> Result<(), String> {
                Age::new(*value).map(|_| ()).map_err(|e| e.to_string())
            })
            .interact_text()?;

        let labels: Vec<&str> = Difficulty::ALL.iter().map(Difficulty::as_str).collect();
        let index = Select::new()
            .with_prompt("How difficult was it to navigate through the tasks")
            .items(&labels)
            .default(0)
            .interact()?;

        let comment: String = Input::new()
            .with_prompt("Any suggestions or thoughts on improving the app?")
            .allow_empty(true)
            .interact_text()?;

        Ok(Action::SubmitFeedback(FeedbackForm {
            name,
            age: Age::new(age)?,
            difficulty: Difficulty::ALL[index],
            comment,
        }))
    }
}

impl Default for Terminal {
    fn default() -> Self {
        Self::new()
    }
}

fn prompt_delivery() -> Result<DeliveryForm> {
    let labels: Vec<String> = DeliveryMethod::ALL.iter().map(|m| m.to_string()).collect();
    let index = Select::new()
        .with_prompt("How would you like to receive your search results")
        .items(&labels)
        .default(0)
        .interact()?;
    let method = DeliveryMethod::ALL[index];

    let contact: String = Input::new()
        .with_prompt(method.contact_prompt())
        .allow_empty(true)
        .interact_text()?;

    Ok(DeliveryForm::new(method, contact))
}

/// Print a notice with a marker for its level
pub fn print_notice(notice: &Notice) {
    match notice.level {
        Level::Success => println!("✓ {}", notice.message),
        Level::Info => println!("\n## {}", notice.message),
        Level::Warning => println!("⚠️  {}", notice.message),
        Level::Error => println!("❌ {}", notice.message),
    }
}
