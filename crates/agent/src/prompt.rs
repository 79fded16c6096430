use serde_json::json;

use rentbot_core::domain::search::SearchCriteria;
use rentbot_core::domain::vehicle::{FuelType, Vehicle, VehicleCategory};

/// Persona and formatting rules for the rental assistant.
///
/// The price format is load-bearing: replies are only illustrated with vehicle images when
/// they quote `"{make} {model}"` next to a `"{currency} {price}/day"` marker.
pub fn system_prompt(currency_code: &str) -> String {
    format!(
        "You are a friendly, helpful and persuasive car rental assistant for a car rental company.
Your goal is to help customers find the perfect rental car through natural conversation.

Your personality:
- Warm and welcoming
- Professional but conversational
- Patient and attentive to details
- Persuasive but not pushy

Your process:
1. Greet customers warmly
2. Ask about their rental needs ONE question at a time (dates, passengers, luggage, budget, preferences)
3. Recommend suitable vehicles based on their requirements
4. Provide clear pricing information and highlight 2-3 key features
5. Guide them toward making a decision

When recommending cars:
- All prices are daily rates in {currency_code}
- Write each recommended car exactly as: **{{year}} {{make}} {{model}}** - {currency_code} {{price}}/day
- Be specific about capacity (passengers and luggage)
- Show at most 2-3 cars at once

Choosing an action:
- Use search_cars when the customer states a budget, passenger count, vehicle type or fuel preference
- Use get_inventory when the customer wants to browse what is available
- Use direct_response for greetings, clarifying questions and anything that needs no car data

CRITICAL RULES:
- Ask ONLY ONE question per response
- Keep responses conversational (2-4 sentences typically)
- Never invent cars, prices or features; only use the car data you are given
- Use emojis sparingly"
    )
}

pub fn search_results_note(
    criteria: &SearchCriteria,
    vehicles: &[Vehicle],
    currency_code: &str,
) -> String {
    format!(
        "Search performed with criteria: {}.\nMatching cars ({} found, prices in {currency_code} per day):\n{}\n\
         If nothing matched, say so and suggest relaxing one criterion.",
        criteria.describe(),
        vehicles.len(),
        vehicles_json(vehicles),
    )
}

pub fn inventory_note(vehicles: &[Vehicle], currency_code: &str) -> String {
    format!(
        "Full available inventory ({} cars, prices in {currency_code} per day):\n{}\n\
         Present only 2-3 options that best fit the conversation so far.",
        vehicles.len(),
        vehicles_json(vehicles),
    )
}

fn vehicles_json(vehicles: &[Vehicle]) -> String {
    let rows = vehicles
        .iter()
        .map(|vehicle| {
            json!({
                "make": vehicle.make,
                "model": vehicle.model,
                "year": vehicle.year,
                "category": vehicle.category,
                "daily_price": vehicle.daily_price.to_string(),
                "passengers": vehicle.passenger_capacity,
                "luggage": vehicle.luggage_capacity,
                "transmission": vehicle.transmission,
                "fuel_type": vehicle.fuel_type,
                "features": vehicle.features,
            })
        })
        .collect::<Vec<_>>();
    serde_json::Value::Array(rows).to_string()
}

/// JSON schema for the action envelope, in the strict form structured-output endpoints
/// accept (every property required, nullable where optional).
pub fn action_schema() -> serde_json::Value {
    let categories = VehicleCategory::ALL.iter().map(VehicleCategory::as_str).collect::<Vec<_>>();
    let fuel_types = FuelType::ALL.iter().map(FuelType::as_str).collect::<Vec<_>>();

    json!({
        "type": "object",
        "additionalProperties": false,
        "required": ["action_type", "search_criteria", "response"],
        "properties": {
            "action_type": {
                "type": "string",
                "enum": ["search_cars", "get_inventory", "direct_response"],
                "description": "Type of action to perform"
            },
            "search_criteria": {
                "anyOf": [
                    {
                        "type": "object",
                        "additionalProperties": false,
                        "required": ["max_price", "min_passengers", "category", "fuel_type"],
                        "properties": {
                            "max_price": {
                                "type": ["number", "null"],
                                "description": "Maximum daily rental price"
                            },
                            "min_passengers": {
                                "type": ["integer", "null"],
                                "description": "Minimum number of passengers (1-15)"
                            },
                            "category": {
                                "anyOf": [
                                    {"type": "string", "enum": categories},
                                    {"type": "null"}
                                ]
                            },
                            "fuel_type": {
                                "anyOf": [
                                    {"type": "string", "enum": fuel_types},
                                    {"type": "null"}
                                ]
                            }
                        }
                    },
                    {"type": "null"}
                ],
                "description": "Search parameters when action_type is search_cars"
            },
            "response": {
                "type": ["string", "null"],
                "description": "Reply text when action_type is direct_response"
            }
        }
    })
}
