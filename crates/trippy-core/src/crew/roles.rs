//! Agent and task definitions for the travel crew
//!
//! Plain data: a role with its goal and backstory, and task prompts filled in
//! from [`CrewInputs`].

use super::CrewInputs;

/// One crew member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentSpec {
    pub role: String,
    pub goal: String,
    pub backstory: String,
}

impl AgentSpec {
    fn new(role: &str, goal: &str, backstory: &str) -> Self {
        Self {
            role: role.to_string(),
            goal: goal.to_string(),
            backstory: backstory.to_string(),
        }
    }

    pub fn city_selector() -> Self {
        Self::new(
            "City Selection Expert",
            "Select the best city based on weather, season, and prices",
            "An expert in analyzing travel data to pick ideal destinations",
        )
    }

    pub fn local_expert() -> Self {
        Self::new(
            "Local Expert at this city",
            "Provide the BEST insights about the selected city",
            "A knowledgeable local guide with extensive information about the city, its attractions and customs",
        )
    }

    pub fn travel_concierge() -> Self {
        Self::new(
            "Amazing Travel Concierge",
            "Create the most amazing travel itineraries with budget and packing suggestions for the city",
            "Specialist in travel planning and logistics with decades of experience",
        )
    }

    /// System prompt for this agent
    pub fn system_prompt(&self) -> String {
        format!(
            "You are {}. {}\nYour personal goal is: {}",
            self.role, self.backstory, self.goal
        )
    }
}

/// One unit of work, assigned to an agent
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub description: String,
    pub expected_output: String,
    pub agent: AgentSpec,
}

impl TaskSpec {
    pub fn identify(agent: AgentSpec, inputs: &CrewInputs) -> Self {
        Self {
            description: format!(
                "Analyze and select the best city for the trip based on weather patterns, \
                 seasonal events and travel costs. Compare the candidate cities on current \
                 weather, upcoming cultural or seasonal events and overall expenses.\n\n\
                 Traveling from: {}\nCity options: {}\nTrip date: {}\nTraveler interests: {}",
                inputs.origin, inputs.cities, inputs.date_range, inputs.interests
            ),
            expected_output: "A detailed report on the chosen city with everything found about it, \
                              including flight costs, weather forecast and attractions."
                .to_string(),
            agent,
        }
    }

    pub fn gather(agent: AgentSpec, inputs: &CrewInputs) -> Self {
        Self {
            description: format!(
                "As a local expert on this city, compile an in-depth guide for someone traveling \
                 there who wants the best trip possible. Cover key attractions, local customs, \
                 special events and daily activity recommendations, including hidden gems only \
                 a local would know.\n\n\
                 Trip date: {}\nTraveling from: {}\nTraveler interests: {}",
                inputs.date_range, inputs.origin, inputs.interests
            ),
            expected_output: "A comprehensive city guide rich in cultural insights and practical tips."
                .to_string(),
            agent,
        }
    }

    pub fn plan(agent: AgentSpec, inputs: &CrewInputs) -> Self {
        Self {
            description: format!(
                "Expand the city guide into a full travel itinerary for {} with detailed per-day \
                 plans, including weather forecasts, places to eat, packing suggestions and a \
                 budget breakdown. Suggest actual places to visit, hotels to stay at and \
                 restaurants to go to.\n\n\
                 Trip date: {}\nTraveling from: {}\nTraveler interests: {}",
                inputs.date_range, inputs.date_range, inputs.origin, inputs.interests
            ),
            expected_output: "A complete travel plan formatted as markdown: a daily schedule, \
                              expected weather, clothing and items to pack, and a detailed budget."
                .to_string(),
            agent,
        }
    }

    /// User prompt for this task, with earlier task results as context
    pub fn prompt(&self, context: &[String]) -> String {
        let mut prompt = format!(
            "Current task: {}\n\nThis is the expected criteria for your final answer: {}\n",
            self.description, self.expected_output
        );
        if !context.is_empty() {
            prompt.push_str("\nThis is the context you're working with:\n");
            prompt.push_str(&context.join("\n\n----------\n\n"));
            prompt.push('\n');
        }
        prompt.push_str("\nBegin! Give your best complete final answer.");
        prompt
    }
}
