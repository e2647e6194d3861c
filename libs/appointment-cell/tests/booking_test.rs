use assert_matches::assert_matches;
use chrono::{Datelike, Duration, Local, NaiveDate, Weekday};
use serde_json::{json, Value};
use wiremock::matchers::{body_partial_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use appointment_cell::models::{
    AppointmentError, AppointmentStatus, BookAppointmentRequest, BookingError,
    RescheduleAppointmentRequest, TimeSlot, ValidateBookingRequest,
};
use appointment_cell::services::AppointmentBookingService;
use shared_models::auth::Session;
use shared_utils::test_utils::{MockClinicResponses, TestConfig, TestUser};

const DOCTOR_ID: &str = "5";
const PATIENT_ID: &str = "patient-1";
const MORNING: &str = TimeSlot::EightToTen.as_str();
const LATE_MORNING: &str = TimeSlot::TenToNoon.as_str();

fn next_weekday(weekday: Weekday) -> NaiveDate {
    let mut date = Local::now().date_naive() + Duration::days(1);
    while date.weekday() != weekday {
        date = date + Duration::days(1);
    }
    date
}

fn patient_session() -> Session {
    TestUser::patient("patient@example.com")
        .with_id(PATIENT_ID)
        .to_session("patient-token")
}

async fn setup(server: &MockServer) -> AppointmentBookingService {
    Mock::given(method("GET"))
        .and(path(format!("/api/doctors/{}", DOCTOR_ID)))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(MockClinicResponses::doctor_response(DOCTOR_ID, "Mon, Wed")),
        )
        .mount(server)
        .await;

    AppointmentBookingService::new(&TestConfig::with_api_url(server.uri()).to_app_config())
}

async fn mount_patient_appointments(server: &MockServer, user_id: &str, rows: Value) {
    Mock::given(method("GET"))
        .and(path("/api/appointments"))
        .and(query_param("userId", user_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

async fn mount_doctor_day(server: &MockServer, date: NaiveDate, rows: Value) {
    Mock::given(method("GET"))
        .and(path("/api/appointments"))
        .and(query_param("doctorId", DOCTOR_ID))
        .and(query_param("appointmentDate", date.format("%Y-%m-%d").to_string()))
        .respond_with(ResponseTemplate::new(200).set_body_json(rows))
        .mount(server)
        .await;
}

fn book_request(date: NaiveDate, time_slot: &str) -> BookAppointmentRequest {
    BookAppointmentRequest {
        doctor_id: DOCTOR_ID.to_string(),
        user_id: None,
        appointment_date: date,
        time_slot: time_slot.to_string(),
        total_amount: None,
    }
}

#[tokio::test]
async fn test_book_appointment_in_free_slot() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);

    mount_patient_appointments(&server, PATIENT_ID, json!([])).await;
    mount_doctor_day(
        &server,
        monday,
        json!([MockClinicResponses::appointment_response("a-1", DOCTOR_ID, "other", monday, MORNING, "Confirmed")]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/api/appointments"))
        .and(body_partial_json(json!({
            "doctorId": DOCTOR_ID,
            "userId": PATIENT_ID,
            "timeSlot": LATE_MORNING,
            "totalAmount": 1500.0
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(
            MockClinicResponses::appointment_response("new-1", DOCTOR_ID, PATIENT_ID, monday, LATE_MORNING, "Pending"),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let appointment = service
        .book_appointment(&patient_session(), book_request(monday, LATE_MORNING))
        .await
        .unwrap();

    assert_eq!(appointment.id, "new-1");
    assert_eq!(appointment.status, AppointmentStatus::Pending);
    assert_eq!(appointment.appointment_date, monday);
}

#[tokio::test]
async fn test_book_appointment_in_taken_slot_is_refused() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);

    mount_patient_appointments(&server, PATIENT_ID, json!([])).await;
    mount_doctor_day(
        &server,
        monday,
        json!([MockClinicResponses::appointment_response("a-1", DOCTOR_ID, "other", monday, MORNING, "Pending")]),
    )
    .await;

    Mock::given(method("POST"))
        .and(path("/api/appointments"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let result = service
        .book_appointment(&patient_session(), book_request(monday, MORNING))
        .await;

    assert_matches!(result, Err(AppointmentError::Booking(BookingError::SlotAlreadyTaken)));
}

#[tokio::test]
async fn test_cancelled_row_does_not_block_slot() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);

    mount_patient_appointments(&server, PATIENT_ID, json!([])).await;
    mount_doctor_day(
        &server,
        monday,
        json!([MockClinicResponses::appointment_response("a-1", DOCTOR_ID, "other", monday, MORNING, "Cancelled")]),
    )
    .await;

    let request = ValidateBookingRequest {
        doctor_id: DOCTOR_ID.to_string(),
        user_id: None,
        appointment_date: monday,
        time_slot: MORNING.to_string(),
        exclude_appointment_id: None,
    };
    let validated = service.validate(&patient_session(), &request).await.unwrap();

    assert_eq!(validated.time_slot, TimeSlot::EightToTen);
    assert_eq!(validated.date, monday);
}

#[tokio::test]
async fn test_server_conflict_is_reported_without_retry() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);

    mount_patient_appointments(&server, PATIENT_ID, json!([])).await;
    mount_doctor_day(&server, monday, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/api/appointments"))
        .respond_with(
            ResponseTemplate::new(409).set_body_json(MockClinicResponses::error_response("slot taken")),
        )
        .expect(1)
        .mount(&server)
        .await;

    let result = service
        .book_appointment(&patient_session(), book_request(monday, MORNING))
        .await;

    assert_matches!(result, Err(AppointmentError::RejectedByServer(body)) => {
        assert!(body.contains("slot taken"));
    });
}

#[tokio::test]
async fn test_patient_with_active_appointment_cannot_book() {
    let server = MockServer::start().await;
    let wednesday = next_weekday(Weekday::Wed);
    let monday = next_weekday(Weekday::Mon);

    mount_patient_appointments(
        &server,
        PATIENT_ID,
        json!([MockClinicResponses::appointment_response("held", DOCTOR_ID, PATIENT_ID, wednesday, MORNING, "Confirmed")]),
    )
    .await;

    // Refused before the doctor is even looked up.
    Mock::given(method("GET"))
        .and(path(format!("/api/doctors/{}", DOCTOR_ID)))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let service = AppointmentBookingService::new(&TestConfig::with_api_url(server.uri()).to_app_config());
    let result = service
        .book_appointment(&patient_session(), book_request(monday, LATE_MORNING))
        .await;

    assert_matches!(
        result,
        Err(AppointmentError::Booking(BookingError::PatientAlreadyHasActiveAppointment))
    );
}

#[tokio::test]
async fn test_past_and_cancelled_history_does_not_block_patient() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);
    let last_year = Local::now().date_naive() - Duration::days(365);

    mount_patient_appointments(
        &server,
        PATIENT_ID,
        json!([
            MockClinicResponses::appointment_response("old", DOCTOR_ID, PATIENT_ID, last_year, MORNING, "Confirmed"),
            MockClinicResponses::appointment_response("gone", DOCTOR_ID, PATIENT_ID, monday, MORNING, "Cancelled")
        ]),
    )
    .await;
    mount_doctor_day(&server, monday, json!([])).await;

    let request = ValidateBookingRequest {
        doctor_id: DOCTOR_ID.to_string(),
        user_id: None,
        appointment_date: monday,
        time_slot: MORNING.to_string(),
        exclude_appointment_id: None,
    };

    assert!(service.validate(&patient_session(), &request).await.is_ok());
}

#[tokio::test]
async fn test_past_date_and_unavailable_day_are_refused() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    mount_patient_appointments(&server, PATIENT_ID, json!([])).await;

    let yesterday = Local::now().date_naive() - Duration::days(1);
    let result = service
        .book_appointment(&patient_session(), book_request(yesterday, MORNING))
        .await;
    assert_matches!(result, Err(AppointmentError::Booking(BookingError::PastDate)));

    let tuesday = next_weekday(Weekday::Tue);
    let result = service
        .book_appointment(&patient_session(), book_request(tuesday, MORNING))
        .await;
    assert_matches!(result, Err(AppointmentError::Booking(BookingError::DoctorUnavailableOnDate)));
}

#[tokio::test]
async fn test_unknown_slot_is_refused() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);

    mount_patient_appointments(&server, PATIENT_ID, json!([])).await;
    mount_doctor_day(&server, monday, json!([])).await;

    let result = service
        .book_appointment(&patient_session(), book_request(monday, &MORNING.to_uppercase()))
        .await;

    assert_matches!(result, Err(AppointmentError::Booking(BookingError::UnknownSlot)));
}

#[tokio::test]
async fn test_patient_cannot_book_for_someone_else() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);

    let mut request = book_request(monday, MORNING);
    request.user_id = Some("someone-else".to_string());

    let result = service.book_appointment(&patient_session(), request).await;
    assert_matches!(result, Err(AppointmentError::Unauthorized));
}

#[tokio::test]
async fn test_admin_books_on_behalf_of_patient() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);

    mount_patient_appointments(&server, "patient-9", json!([])).await;
    mount_doctor_day(&server, monday, json!([])).await;

    Mock::given(method("POST"))
        .and(path("/api/appointments"))
        .and(body_partial_json(json!({ "userId": "patient-9", "totalAmount": 800.0 })))
        .respond_with(ResponseTemplate::new(201).set_body_json(
            MockClinicResponses::appointment_response("new-9", DOCTOR_ID, "patient-9", monday, MORNING, "Pending"),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let admin = TestUser::admin("admin@example.com").to_session("admin-token");
    let mut request = book_request(monday, MORNING);
    request.user_id = Some("patient-9".to_string());
    request.total_amount = Some(800.0);

    let appointment = service.book_appointment(&admin, request).await.unwrap();
    assert_eq!(appointment.user_id, "patient-9");
}

#[tokio::test]
async fn test_reschedule_into_own_slot_is_allowed() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);
    let held = MockClinicResponses::appointment_response("apt-1", DOCTOR_ID, PATIENT_ID, monday, MORNING, "Confirmed");

    Mock::given(method("GET"))
        .and(path("/api/appointments/apt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(held.clone()))
        .mount(&server)
        .await;
    mount_doctor_day(&server, monday, json!([held])).await;

    Mock::given(method("PUT"))
        .and(path("/api/appointments/apt-1"))
        .and(body_partial_json(json!({
            "appointmentId": "apt-1",
            "userId": PATIENT_ID,
            "timeSlot": MORNING
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockClinicResponses::appointment_response("apt-1", DOCTOR_ID, PATIENT_ID, monday, MORNING, "Confirmed"),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let request = RescheduleAppointmentRequest {
        doctor_id: None,
        appointment_date: monday,
        time_slot: MORNING.to_string(),
        total_amount: None,
    };
    let updated = service
        .reschedule_appointment(&patient_session(), "apt-1", request)
        .await
        .unwrap();

    assert_eq!(updated.id, "apt-1");
}

#[tokio::test]
async fn test_reschedule_into_other_patients_slot_is_refused() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);
    let held = MockClinicResponses::appointment_response("apt-1", DOCTOR_ID, PATIENT_ID, monday, MORNING, "Pending");
    let other = MockClinicResponses::appointment_response("apt-2", DOCTOR_ID, "other", monday, LATE_MORNING, "Pending");

    Mock::given(method("GET"))
        .and(path("/api/appointments/apt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(held.clone()))
        .mount(&server)
        .await;
    mount_doctor_day(&server, monday, json!([held, other])).await;

    let request = RescheduleAppointmentRequest {
        doctor_id: None,
        appointment_date: monday,
        time_slot: LATE_MORNING.to_string(),
        total_amount: None,
    };
    let result = service
        .reschedule_appointment(&patient_session(), "apt-1", request)
        .await;

    assert_matches!(result, Err(AppointmentError::Booking(BookingError::SlotAlreadyTaken)));
}

#[tokio::test]
async fn test_reschedule_of_foreign_appointment_is_unauthorized() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);

    Mock::given(method("GET"))
        .and(path("/api/appointments/apt-7"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockClinicResponses::appointment_response("apt-7", DOCTOR_ID, "other", monday, MORNING, "Pending"),
        ))
        .mount(&server)
        .await;

    let request = RescheduleAppointmentRequest {
        doctor_id: None,
        appointment_date: monday,
        time_slot: LATE_MORNING.to_string(),
        total_amount: None,
    };
    let result = service
        .reschedule_appointment(&patient_session(), "apt-7", request)
        .await;

    assert_matches!(result, Err(AppointmentError::Unauthorized));
}

#[tokio::test]
async fn test_cancel_appointment() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);

    Mock::given(method("GET"))
        .and(path("/api/appointments/apt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockClinicResponses::appointment_response("apt-1", DOCTOR_ID, PATIENT_ID, monday, MORNING, "Confirmed"),
        ))
        .mount(&server)
        .await;

    Mock::given(method("PATCH"))
        .and(path("/api/appointments/apt-1"))
        .and(body_partial_json(json!({ "status": "Cancelled" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockClinicResponses::appointment_response("apt-1", DOCTOR_ID, PATIENT_ID, monday, MORNING, "Cancelled"),
        ))
        .expect(1)
        .mount(&server)
        .await;

    let cancelled = service.cancel_appointment(&patient_session(), "apt-1").await.unwrap();
    assert_eq!(cancelled.status, AppointmentStatus::Cancelled);
}

#[tokio::test]
async fn test_cancel_twice_is_refused() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);

    Mock::given(method("GET"))
        .and(path("/api/appointments/apt-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(
            MockClinicResponses::appointment_response("apt-1", DOCTOR_ID, PATIENT_ID, monday, MORNING, "Cancelled"),
        ))
        .mount(&server)
        .await;

    let result = service.cancel_appointment(&patient_session(), "apt-1").await;
    assert_matches!(
        result,
        Err(AppointmentError::InvalidStatusTransition(AppointmentStatus::Cancelled))
    );
}

#[tokio::test]
async fn test_missing_appointment_maps_to_not_found() {
    let server = MockServer::start().await;
    let service = setup(&server).await;

    Mock::given(method("GET"))
        .and(path("/api/appointments/nope"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = service.cancel_appointment(&patient_session(), "nope").await;
    assert_matches!(result, Err(AppointmentError::NotFound));
}

#[tokio::test]
async fn test_free_slots_excludes_rescheduled_appointment() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);

    mount_doctor_day(
        &server,
        monday,
        json!([
            MockClinicResponses::appointment_response("apt-1", DOCTOR_ID, PATIENT_ID, monday, MORNING, "Pending"),
            MockClinicResponses::appointment_response("apt-2", DOCTOR_ID, "other", monday, LATE_MORNING, "Confirmed")
        ]),
    )
    .await;

    let all = service.free_slots(DOCTOR_ID, monday, None, None).await.unwrap();
    assert_eq!(all.doctor_id, DOCTOR_ID);
    assert!(all.available);
    assert_eq!(all.free_slots.len(), 3);

    let excluding = service.free_slots(DOCTOR_ID, monday, Some("apt-1"), None).await.unwrap();
    assert_eq!(excluding.free_slots.len(), 4);
    assert_eq!(excluding.free_slots[0], TimeSlot::EightToTen);
    assert!(!excluding.free_slots.contains(&TimeSlot::TenToNoon));
}

#[tokio::test]
async fn test_free_slots_on_unavailable_day_is_empty() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let tuesday = next_weekday(Weekday::Tue);

    let response = service.free_slots(DOCTOR_ID, tuesday, None, None).await.unwrap();

    assert!(!response.available);
    assert!(response.free_slots.is_empty());
}

#[tokio::test]
async fn test_my_appointments_are_filtered_to_owner() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);

    mount_patient_appointments(
        &server,
        PATIENT_ID,
        json!([
            MockClinicResponses::appointment_response("mine", DOCTOR_ID, PATIENT_ID, monday, MORNING, "Pending"),
            MockClinicResponses::appointment_response("theirs", DOCTOR_ID, "other", monday, LATE_MORNING, "Pending")
        ]),
    )
    .await;

    let appointments = service
        .get_patient_appointments(PATIENT_ID, "patient-token")
        .await
        .unwrap();

    assert_eq!(appointments.len(), 1);
    assert_eq!(appointments[0].id, "mine");
}

fn reschedule_preview(date: NaiveDate, time_slot: &str, appointment_id: &str) -> ValidateBookingRequest {
    ValidateBookingRequest {
        doctor_id: DOCTOR_ID.to_string(),
        user_id: None,
        appointment_date: date,
        time_slot: time_slot.to_string(),
        exclude_appointment_id: Some(appointment_id.to_string()),
    }
}

async fn mount_appointment(server: &MockServer, row: Value) {
    let id = row["id"].as_str().unwrap_or_default().to_string();
    Mock::given(method("GET"))
        .and(path(format!("/api/appointments/{}", id)))
        .respond_with(ResponseTemplate::new(200).set_body_json(row))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_validate_previews_reschedule_into_own_slot() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);
    let held = MockClinicResponses::appointment_response("apt-1", DOCTOR_ID, PATIENT_ID, monday, MORNING, "Confirmed");

    mount_appointment(&server, held.clone()).await;
    mount_doctor_day(&server, monday, json!([held])).await;

    let validated = service
        .validate(&patient_session(), &reschedule_preview(monday, MORNING, "apt-1"))
        .await
        .unwrap();

    assert_eq!(validated.time_slot, TimeSlot::EightToTen);
}

#[tokio::test]
async fn test_validate_refuses_foreign_exclusion() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);
    let wednesday = next_weekday(Weekday::Wed);
    let theirs = MockClinicResponses::appointment_response("theirs", DOCTOR_ID, "other", monday, MORNING, "Confirmed");

    mount_patient_appointments(
        &server,
        PATIENT_ID,
        json!([MockClinicResponses::appointment_response("held", DOCTOR_ID, PATIENT_ID, wednesday, LATE_MORNING, "Confirmed")]),
    )
    .await;
    mount_appointment(&server, theirs.clone()).await;
    mount_doctor_day(&server, monday, json!([theirs])).await;

    let result = service
        .validate(&patient_session(), &reschedule_preview(monday, MORNING, "theirs"))
        .await;

    assert_matches!(result, Err(AppointmentError::Unauthorized));
}

#[tokio::test]
async fn test_admin_cannot_exclude_another_patients_appointment() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);

    mount_appointment(
        &server,
        MockClinicResponses::appointment_response("theirs", DOCTOR_ID, "other", monday, MORNING, "Confirmed"),
    )
    .await;

    let admin = TestUser::admin("admin@example.com").to_session("admin-token");
    let mut request = reschedule_preview(monday, MORNING, "theirs");
    request.user_id = Some(PATIENT_ID.to_string());

    let result = service.validate(&admin, &request).await;
    assert_matches!(result, Err(AppointmentError::Unauthorized));
}

#[tokio::test]
async fn test_validate_refuses_missing_or_cancelled_exclusion() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);

    Mock::given(method("GET"))
        .and(path("/api/appointments/ghost"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;
    mount_appointment(
        &server,
        MockClinicResponses::appointment_response("gone", DOCTOR_ID, PATIENT_ID, monday, MORNING, "Cancelled"),
    )
    .await;

    let missing = service
        .validate(&patient_session(), &reschedule_preview(monday, MORNING, "ghost"))
        .await;
    assert_matches!(missing, Err(AppointmentError::NotFound));

    let cancelled = service
        .validate(&patient_session(), &reschedule_preview(monday, MORNING, "gone"))
        .await;
    assert_matches!(
        cancelled,
        Err(AppointmentError::InvalidStatusTransition(AppointmentStatus::Cancelled))
    );
}

#[tokio::test]
async fn test_reschedule_free_slots_count_own_slot_as_free() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);
    let held = MockClinicResponses::appointment_response("apt-1", DOCTOR_ID, PATIENT_ID, monday, MORNING, "Pending");

    mount_appointment(&server, held.clone()).await;
    mount_doctor_day(&server, monday, json!([held])).await;

    let response = service
        .reschedule_free_slots(&patient_session(), "apt-1", monday)
        .await
        .unwrap();

    assert_eq!(response.free_slots, TimeSlot::ALL.to_vec());
}

#[tokio::test]
async fn test_reschedule_free_slots_of_foreign_appointment_is_unauthorized() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);

    mount_appointment(
        &server,
        MockClinicResponses::appointment_response("theirs", DOCTOR_ID, "other", monday, MORNING, "Pending"),
    )
    .await;

    let result = service
        .reschedule_free_slots(&patient_session(), "theirs", monday)
        .await;

    assert_matches!(result, Err(AppointmentError::Unauthorized));
}

#[tokio::test]
async fn test_refused_cancel_is_not_a_slot_rejection() {
    let server = MockServer::start().await;
    let service = setup(&server).await;
    let monday = next_weekday(Weekday::Mon);

    mount_appointment(
        &server,
        MockClinicResponses::appointment_response("apt-1", DOCTOR_ID, PATIENT_ID, monday, MORNING, "Pending"),
    )
    .await;
    Mock::given(method("PATCH"))
        .and(path("/api/appointments/apt-1"))
        .respond_with(ResponseTemplate::new(409).set_body_json(MockClinicResponses::error_response("locked")))
        .expect(1)
        .mount(&server)
        .await;

    let result = service.cancel_appointment(&patient_session(), "apt-1").await;

    assert_matches!(result, Err(AppointmentError::StatusChangeRejected(detail)) => {
        assert!(detail.contains("locked"));
    });
}
