use utoipa::OpenApi;

#[derive(OpenApi)]
/// Aggregated OpenAPI specification for the trivia rooms backend.
#[openapi(
    paths(
        crate::routes::health::healthcheck,
        crate::routes::question::get_question,
        crate::routes::room::create_room,
        crate::routes::room::join_room,
        crate::routes::room::room_state,
        crate::routes::room::start_game,
        crate::routes::room::submit_answer,
        crate::routes::room::leave_room,
    ),
    components(
        schemas(
            crate::dto::health::HealthResponse,
            crate::dto::question::QuestionDto,
            crate::dto::room::CreateRoomRequest,
            crate::dto::room::CreateRoomResponse,
            crate::dto::room::JoinRoomRequest,
            crate::dto::room::JoinRoomResponse,
            crate::dto::room::RoomStateResponse,
            crate::dto::room::StartGameRequest,
            crate::dto::room::StartGameResponse,
            crate::dto::room::SubmitAnswerRequest,
            crate::dto::room::SubmitAnswerResponse,
            crate::dto::room::LeaveRoomRequest,
            crate::dto::room::PlayerSummary,
        )
    ),
    tags(
        (name = "health", description = "Health check endpoints"),
        (name = "room", description = "Room lifecycle and gameplay"),
        (name = "question", description = "Standalone question fetching"),
    )
)]
pub struct ApiDoc;
