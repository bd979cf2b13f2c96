pub mod email_service;
pub mod gemini_service;
pub mod google_auth_service;
pub mod llm;
pub mod openrouter_service;
pub mod perplexity_service;
pub mod pixabay_service;
pub mod places_service;
pub mod prompt_service;
