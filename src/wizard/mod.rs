use anyhow::Result;
use tracing::{info, warn};

use crate::config::Config;
use crate::error::WizardError;
use crate::geocode::GeocodingClient;
use crate::render::ResultsView;
use crate::session::{SearchResults, Session, Step, Task};
use crate::sheets::{FeedbackRecord, SheetClient};
use crate::stations::{StationClient, StationQuery};

mod forms;

pub use forms::*;

/// The three external collaborators
pub struct Services {
    pub geocoder: GeocodingClient,
    pub stations: StationClient,
    pub sheet: SheetClient,
}

impl Services {
    pub fn new(config: &Config) -> Result<Self> {
        if config.sheets.resolved_spreadsheet_id().is_none() {
            warn!("No spreadsheet id configured; feedback submission will fail");
        }

        Ok(Services {
            geocoder: GeocodingClient::new(config)?,
            stations: StationClient::new(config)?,
            sheet: SheetClient::new(config)?,
        })
    }

    /// Validate a search, geocode it and fetch the nearest stations
    pub fn lookup(&self, form: &SearchForm) -> Result<SearchResults, WizardError> {
        let location = form.location.trim();
        if location.is_empty() {
            return Err(WizardError::Validation(
                "Please enter a city, address or zip code".to_string(),
            ));
        }
        if form.fuel_types.is_empty() {
            return Err(WizardError::Validation(
                "Please select one or more fuel type".to_string(),
            ));
        }

        let point = match self.geocoder.locate(location) {
            Ok(Some(point)) => point,
            Ok(None) => return Err(WizardError::LocationNotFound),
            Err(e) => {
                warn!("Geocoding '{}' failed: {:#}", location, e);
                return Err(WizardError::LocationNotFound);
            }
        };

        let query = StationQuery {
            point,
            fuel_types: form.fuel_types.clone(),
            limit: form.limit,
        };
        let stations = self.stations.nearest(&query).map_err(|e| {
            warn!("Station lookup failed: {:#}", e);
            WizardError::StationLookupFailed(e)
        })?;

        if stations.is_empty() {
            return Err(WizardError::NoStationsFound);
        }

        Ok(SearchResults::new(stations))
    }
}

/// Drives one participant through the usability test.
///
/// Every action either succeeds with a notice, possibly moving to another
/// step, or fails with a [`WizardError`] and leaves the step unchanged.
pub struct Wizard {
    session: Session,
    services: Services,
    submitted: Option<FeedbackRecord>,
}

impl Wizard {
    pub fn new(services: Services) -> Self {
        Wizard {
            session: Session::new(),
            services,
            submitted: None,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn step(&self) -> Step {
        self.session.step()
    }

    /// The feedback row written at the end of the test, once submitted
    pub fn submitted(&self) -> Option<&FeedbackRecord> {
        self.submitted.as_ref()
    }

    /// What the results step shows, if a search has succeeded
    pub fn results_view(&self) -> Option<ResultsView<'_>> {
        self.session
            .results()
            .map(|results| ResultsView::new(&self.session.search_location, results))
    }

    /// Handle one participant action
    pub fn dispatch(&mut self, action: Action) -> Result<Notice, WizardError> {
        let step = self.session.step();
        if action.step() != step {
            return Err(WizardError::InvalidAction {
                step,
                action: action.name(),
            });
        }

        let result = match action {
            Action::Start => self.start(),
            Action::Search(form) => self.search(&form),
            Action::BackToSearch => self.back_to_search(),
            Action::ContinueToDelivery => self.continue_to_delivery(),
            Action::SendResults(form) => self.send_results(&form),
            Action::ContinueToFeedback(form) => self.continue_to_feedback(&form),
            Action::SubmitFeedback(form) => self.submit_feedback(form),
        };

        match &result {
            Err(e) if e.is_lookup() => warn!("{} lookup failed: {}", step, e),
            Err(e) => info!("{} rejected: {}", step, e),
            Ok(_) => {}
        }
        result
    }

    fn start(&mut self) -> Result<Notice, WizardError> {
        self.session.transition(Step::Task1)?;
        Ok(Notice::info("Task 1: Search for Alternative Fuel Stations"))
    }

    fn search(&mut self, form: &SearchForm) -> Result<Notice, WizardError> {
        let results = self.services.lookup(form)?;
        let location = form.location.trim();
        let summary = format!(
            "Found {} fuel stations near your {}.",
            results.stations.len(),
            location
        );

        self.session.store_results(location, results.stations);
        self.session.mark_task_end(Task::Search);
        self.session.set_success(Task::Search, true);
        self.session.transition(Step::Task2)?;

        Ok(Notice::success(summary))
    }

    fn back_to_search(&mut self) -> Result<Notice, WizardError> {
        // Leaving without results counts as a failed results task
        if self.session.results().is_none() {
            self.session.set_success(Task::Results, false);
            self.session.mark_task_end(Task::Results);
        }
        self.session.transition(Step::Task1)?;
        Ok(Notice::info("Task 1: Search for Alternative Fuel Stations"))
    }

    fn continue_to_delivery(&mut self) -> Result<Notice, WizardError> {
        if self.session.results().is_none() {
            return Err(WizardError::NoResults);
        }

        self.session.mark_task_end(Task::Results);
        self.session.set_success(Task::Results, true);
        self.session.transition(Step::Task3)?;
        Ok(Notice::info("Task 3: Choose How to Receive Your Search Results"))
    }

    fn send_results(&mut self, form: &DeliveryForm) -> Result<Notice, WizardError> {
        let channel = form.method.to_string().to_lowercase();

        if !form.has_contact() {
            self.session.results_sent = false;
            self.session.sent_via = None;
            return Err(WizardError::Validation(format!(
                "Please enter your {}.",
                channel
            )));
        }

        // Delivery is simulated; nothing leaves the process
        self.session.results_sent = true;
        self.session.sent_via = Some(form.method);
        Ok(Notice::success(format!(
            "Search results will be sent to {}. Click Feedback to continue",
            channel
        )))
    }

    fn continue_to_feedback(&mut self, form: &DeliveryForm) -> Result<Notice, WizardError> {
        let sent = self.session.results_sent && self.session.sent_via == Some(form.method);
        if !sent || !form.has_contact() {
            return Err(WizardError::ResultsNotSent);
        }

        self.session.mark_task_end(Task::Delivery);
        self.session.set_success(Task::Delivery, true);
        self.session.transition(Step::Feedback)?;
        Ok(Notice::info("Usability Feedback"))
    }

    fn submit_feedback(&mut self, form: FeedbackForm) -> Result<Notice, WizardError> {
        let name = form.name.trim();
        if name.is_empty() {
            return Err(WizardError::Validation(
                "Please enter your first and last name.".to_string(),
            ));
        }
        if form.comment.trim().is_empty() {
            return Err(WizardError::EmptyComment);
        }

        let record = FeedbackRecord::new(
            name,
            form.age,
            form.difficulty,
            form.comment.trim(),
            self.session.durations(),
            self.session.successes(),
        );

        self.services.sheet.append(&record).map_err(|e| {
            warn!("Failed to append feedback row: {:#}", e);
            WizardError::Persistence(e)
        })?;

        self.session.transition(Step::ThankYou)?;
        self.submitted = Some(record);
        Ok(Notice::success("Feedback submitted. Redirecting....."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Level;
    use crate::fuel::{FuelType, ResultLimit};
    use crate::geocode::MockGeocoder;
    use crate::sheets::{Age, Difficulty, MockSheet};
    use crate::stations::MockStations;
    use crate::test_utils::{create_test_stations, create_test_wizard, search_form};
    use serde_json::json;

    fn feedback(name: &str, comment: &str) -> FeedbackForm {
        FeedbackForm {
            name: name.to_string(),
            age: Age::new(29).unwrap(),
            difficulty: Difficulty::Easy,
            comment: comment.to_string(),
        }
    }

    fn email(contact: &str) -> DeliveryForm {
        DeliveryForm::new(DeliveryMethod::Email, contact)
    }

    /// Run a wizard with three stations up to `target`
    fn advance_to(target: Step) -> Wizard {
        let mut wizard = create_test_wizard(create_test_stations(3));
        let path = [
            (Step::Task1, Action::Start),
            (Step::Task2, Action::Search(search_form("10001"))),
            (Step::Task3, Action::ContinueToDelivery),
            (Step::Feedback, Action::ContinueToFeedback(email("jane@example.com"))),
        ];

        for (next, action) in path {
            if wizard.step() == target {
                break;
            }
            if next == Step::Feedback {
                wizard.dispatch(Action::SendResults(email("jane@example.com"))).unwrap();
            }
            wizard.dispatch(action).unwrap();
        }
        assert_eq!(wizard.step(), target);
        wizard
    }

    fn mock_sheet(wizard: &Wizard) -> &MockSheet {
        match &wizard.services.sheet {
            SheetClient::Mock(mock) => mock,
            _ => panic!("Expected mock sheet"),
        }
    }

    #[test]
    fn test_services_build_without_sheet_config() {
        let mut config = Config::default();
        config.sheets.spreadsheet_id = Some(" ".to_string());
        config.stations.api_key = Some(String::new());

        // A missing sheet only fails at submit time
        let services = Services::new(&config).unwrap();
        assert!(matches!(services.sheet, SheetClient::Real(_)));
        assert!(matches!(services.stations, StationClient::Real(_)));
    }

    #[test]
    fn test_start_moves_to_search() {
        let mut wizard = create_test_wizard(vec![]);
        assert_eq!(wizard.step(), Step::Intro);

        wizard.dispatch(Action::Start).unwrap();
        assert_eq!(wizard.step(), Step::Task1);
        assert!(wizard.session().task(Task::Search).started_at.is_some());
    }

    #[test]
    fn test_search_success_advances() {
        let mut wizard = advance_to(Step::Task1);

        let notice = wizard
            .dispatch(Action::Search(SearchForm::new(
                "10001",
                vec![FuelType::Elec],
                ResultLimit::new(10).unwrap(),
            )))
            .unwrap();

        assert_eq!(notice.level, Level::Success);
        assert_eq!(notice.message, "Found 3 fuel stations near your 10001.");
        assert_eq!(wizard.step(), Step::Task2);
        assert!(wizard.session().task(Task::Search).success);

        let results = wizard.session().results().unwrap();
        assert_eq!(results.stations.len(), 3);
        assert_eq!(results.locations.len(), 3);
        assert_eq!(wizard.session().search_location, "10001");
    }

    #[test]
    fn test_search_sends_coordinates_and_fuel_types() {
        let mut wizard = advance_to(Step::Task1);
        let form = SearchForm::new(
            "  10001 ",
            vec![FuelType::Elec, FuelType::Hy],
            ResultLimit::new(50).unwrap(),
        );
        wizard.dispatch(Action::Search(form)).unwrap();

        match &wizard.services.stations {
            StationClient::Mock(mock) => {
                let queries = mock.queries.borrow();
                assert_eq!(queries[0].point.lat, 40.7506);
                assert_eq!(queries[0].fuel_types, vec![FuelType::Elec, FuelType::Hy]);
                assert_eq!(queries[0].limit.get(), 50);
            }
            _ => panic!("Expected mock stations"),
        }
        assert_eq!(wizard.session().search_location, "10001");
    }

    #[test]
    fn test_empty_location_is_blocked() {
        let mut wizard = advance_to(Step::Task1);

        let err = wizard.dispatch(Action::Search(search_form("   "))).unwrap_err();
        assert!(err.is_validation());
        assert_eq!(err.to_string(), "Please enter a city, address or zip code");
        assert_eq!(wizard.step(), Step::Task1);
        assert!(!wizard.session().task(Task::Search).success);
    }

    #[test]
    fn test_no_fuel_types_is_blocked() {
        let mut wizard = advance_to(Step::Task1);
        let form = SearchForm::new("10001", vec![], ResultLimit::default());

        let err = wizard.dispatch(Action::Search(form)).unwrap_err();
        assert_eq!(err.to_string(), "Please select one or more fuel type");
        assert_eq!(wizard.step(), Step::Task1);
    }

    #[test]
    fn test_unknown_location_is_lookup_failure() {
        let mut wizard = advance_to(Step::Task1);

        let err = wizard.dispatch(Action::Search(search_form("Atlantis"))).unwrap_err();
        assert!(matches!(err, WizardError::LocationNotFound));
        assert_eq!(wizard.step(), Step::Task1);
        assert!(wizard.session().results().is_none());
    }

    #[test]
    fn test_geocoder_error_is_location_not_found() {
        let mut wizard = advance_to(Step::Task1);
        wizard.services.geocoder = GeocodingClient::Mock(MockGeocoder {
            fail: true,
            ..MockGeocoder::new()
        });

        let err = wizard.dispatch(Action::Search(search_form("10001"))).unwrap_err();
        assert!(matches!(err, WizardError::LocationNotFound));
    }

    #[test]
    fn test_empty_station_list_warns_and_stays() {
        let mut wizard = create_test_wizard(vec![]);
        wizard.dispatch(Action::Start).unwrap();

        let err = wizard.dispatch(Action::Search(search_form("10001"))).unwrap_err();
        assert!(matches!(err, WizardError::NoStationsFound));
        assert_eq!(err.level(), Level::Warning);
        assert_eq!(wizard.step(), Step::Task1);
        assert!(wizard.session().results().is_none());
    }

    #[test]
    fn test_station_api_failure_stays() {
        let mut wizard = advance_to(Step::Task1);
        wizard.services.stations = StationClient::Mock(MockStations::failing());

        let err = wizard.dispatch(Action::Search(search_form("10001"))).unwrap_err();
        assert!(matches!(err, WizardError::StationLookupFailed(_)));
        assert_eq!(err.to_string(), "Error retrieving fuel station data.");
        assert_eq!(wizard.step(), Step::Task1);
    }

    #[test]
    fn test_failed_research_keeps_previous_results() {
        let mut wizard = advance_to(Step::Task2);
        wizard.dispatch(Action::BackToSearch).unwrap();

        wizard.dispatch(Action::Search(search_form("Atlantis"))).unwrap_err();
        let results = wizard.session().results().unwrap();
        assert_eq!(results.stations.len(), results.locations.len());
        assert_eq!(wizard.session().search_location, "10001");
    }

    #[test]
    fn test_back_to_search_keeps_success_flags() {
        let mut wizard = advance_to(Step::Task2);

        wizard.dispatch(Action::BackToSearch).unwrap();
        assert_eq!(wizard.step(), Step::Task1);
        assert!(wizard.session().task(Task::Search).success);
        assert!(wizard.session().results().is_some());
    }

    #[test]
    fn test_back_without_results_fails_task_two() {
        let mut wizard = advance_to(Step::Task2);
        wizard.session.clear_results();

        let err = wizard.dispatch(Action::ContinueToDelivery).unwrap_err();
        assert!(matches!(err, WizardError::NoResults));
        assert_eq!(wizard.step(), Step::Task2);

        wizard.dispatch(Action::BackToSearch).unwrap();
        assert_eq!(wizard.step(), Step::Task1);
        assert!(!wizard.session().task(Task::Results).success);
        assert!(wizard.session().task(Task::Results).duration_secs.is_some());
    }

    #[test]
    fn test_continue_to_delivery_marks_success() {
        let mut wizard = advance_to(Step::Task2);
        wizard.dispatch(Action::ContinueToDelivery).unwrap();

        assert_eq!(wizard.step(), Step::Task3);
        assert!(wizard.session().task(Task::Results).success);
        assert!(wizard.session().task(Task::Delivery).started_at.is_some());
    }

    #[test]
    fn test_results_view() {
        let wizard = advance_to(Step::Task2);
        let view = wizard.results_view().unwrap();

        assert_eq!(view.summary(), "Found 3 fuel stations near your 10001.");
        assert_eq!(view.distribution[0].label, "Electric");
        assert_eq!(view.distribution[0].count, 3);
    }

    #[test]
    fn test_send_without_contact_is_blocked() {
        let mut wizard = advance_to(Step::Task3);

        let err = wizard.dispatch(Action::SendResults(email(""))).unwrap_err();
        assert_eq!(err.to_string(), "Please enter your email.");
        assert!(!wizard.session().results_sent);

        let err = wizard.dispatch(Action::ContinueToFeedback(email(""))).unwrap_err();
        assert!(matches!(err, WizardError::ResultsNotSent));
        assert_eq!(wizard.step(), Step::Task3);
    }

    #[test]
    fn test_send_then_feedback() {
        let mut wizard = advance_to(Step::Task3);
        let form = DeliveryForm::new(DeliveryMethod::TextMessage, "+1 555 0100");

        let notice = wizard.dispatch(Action::SendResults(form.clone())).unwrap();
        assert_eq!(
            notice.message,
            "Search results will be sent to text message. Click Feedback to continue"
        );
        assert!(wizard.session().results_sent);

        wizard.dispatch(Action::ContinueToFeedback(form)).unwrap();
        assert_eq!(wizard.step(), Step::Feedback);
        assert!(wizard.session().task(Task::Delivery).success);
    }

    #[test]
    fn test_feedback_requires_contact_at_click_time() {
        let mut wizard = advance_to(Step::Task3);
        wizard.dispatch(Action::SendResults(email("jane@example.com"))).unwrap();

        let err = wizard.dispatch(Action::ContinueToFeedback(email("  "))).unwrap_err();
        assert!(matches!(err, WizardError::ResultsNotSent));
        assert_eq!(wizard.step(), Step::Task3);
    }

    #[test]
    fn test_switching_channel_requires_new_send() {
        let mut wizard = advance_to(Step::Task3);
        wizard.dispatch(Action::SendResults(email("jane@example.com"))).unwrap();

        let text = DeliveryForm::new(DeliveryMethod::TextMessage, "+1 555 0100");
        let err = wizard.dispatch(Action::ContinueToFeedback(text)).unwrap_err();
        assert!(matches!(err, WizardError::ResultsNotSent));
    }

    #[test]
    fn test_failed_send_clears_sent_flag() {
        let mut wizard = advance_to(Step::Task3);
        wizard.dispatch(Action::SendResults(email("jane@example.com"))).unwrap();
        wizard.dispatch(Action::SendResults(email(""))).unwrap_err();

        assert!(!wizard.session().results_sent);
        let err = wizard
            .dispatch(Action::ContinueToFeedback(email("jane@example.com")))
            .unwrap_err();
        assert!(matches!(err, WizardError::ResultsNotSent));
    }

    #[test]
    fn test_feedback_requires_name() {
        let mut wizard = advance_to(Step::Feedback);

        let err = wizard
            .dispatch(Action::SubmitFeedback(feedback(" ", "great tool")))
            .unwrap_err();
        assert_eq!(err.to_string(), "Please enter your first and last name.");
        assert_eq!(wizard.step(), Step::Feedback);
        assert!(mock_sheet(&wizard).rows.borrow().is_empty());
    }

    #[test]
    fn test_empty_comment_blocks_submission() {
        let mut wizard = advance_to(Step::Feedback);

        let err = wizard
            .dispatch(Action::SubmitFeedback(feedback("Jane Doe", "")))
            .unwrap_err();
        assert!(matches!(err, WizardError::EmptyComment));
        assert_eq!(err.level(), Level::Warning);
        assert_eq!(wizard.step(), Step::Feedback);
        assert!(mock_sheet(&wizard).rows.borrow().is_empty());
    }

    #[test]
    fn test_feedback_appends_one_row() {
        let mut wizard = advance_to(Step::Feedback);

        let notice = wizard
            .dispatch(Action::SubmitFeedback(feedback("Jane Doe", "great tool")))
            .unwrap();
        assert_eq!(notice.message, "Feedback submitted. Redirecting.....");
        assert_eq!(wizard.step(), Step::ThankYou);

        let rows = mock_sheet(&wizard).rows.borrow();
        assert_eq!(rows.len(), 1);
        let row = &rows[0];
        assert_eq!(row.len(), 10);
        assert_eq!(row[0], json!("Jane Doe"));
        assert_eq!(row[1], json!(29));
        assert_eq!(row[2], json!("Easy"));
        assert_eq!(row[3], json!("great tool"));
        for duration in &row[4..7] {
            assert!(duration.as_f64().unwrap() >= 0.0);
        }
        assert_eq!(&row[7..], &[json!(true), json!(true), json!(true)]);

        let record = wizard.submitted().unwrap();
        assert_eq!(record.name(), "Jane Doe");
        assert_eq!(record.age().get(), 29);
        assert_eq!(record.difficulty(), Difficulty::Easy);
        assert_eq!(record.comment(), "great tool");
        assert_eq!(record.successes(), [true, true, true]);
    }

    #[test]
    fn test_persistence_failure_is_recoverable() {
        let mut wizard = advance_to(Step::Feedback);
        wizard.services.sheet = SheetClient::Mock(MockSheet::failing());

        let err = wizard
            .dispatch(Action::SubmitFeedback(feedback("Jane Doe", "great tool")))
            .unwrap_err();
        assert!(matches!(err, WizardError::Persistence(_)));
        assert!(err.to_string().starts_with("Failed to submit feedback: "));
        assert_eq!(wizard.step(), Step::Feedback);
        assert!(wizard.submitted().is_none());

        wizard.services.sheet = SheetClient::Mock(MockSheet::new());
        wizard
            .dispatch(Action::SubmitFeedback(feedback("Jane Doe", "great tool")))
            .unwrap();
        assert_eq!(wizard.step(), Step::ThankYou);
    }

    #[test]
    fn test_actions_outside_their_step_are_rejected() {
        let mut wizard = create_test_wizard(create_test_stations(1));

        let err = wizard.dispatch(Action::ContinueToDelivery).unwrap_err();
        assert!(matches!(
            err,
            WizardError::InvalidAction {
                step: Step::Intro,
                ..
            }
        ));
        assert_eq!(wizard.step(), Step::Intro);

        let mut wizard = advance_to(Step::Task3);
        let err = wizard.dispatch(Action::BackToSearch).unwrap_err();
        assert_eq!(err.to_string(), "'Back to Search' is not available during Task 3");
        assert_eq!(wizard.step(), Step::Task3);
    }

    #[test]
    fn test_thank_you_accepts_nothing() {
        let mut wizard = advance_to(Step::Feedback);
        wizard
            .dispatch(Action::SubmitFeedback(feedback("Jane Doe", "great tool")))
            .unwrap();

        assert!(wizard.dispatch(Action::Start).is_err());
        assert!(wizard
            .dispatch(Action::SubmitFeedback(feedback("Jane Doe", "again")))
            .is_err());
        assert_eq!(wizard.step(), Step::ThankYou);
        assert_eq!(mock_sheet(&wizard).rows.borrow().len(), 1);
    }
}
