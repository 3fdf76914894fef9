use std::io::{self, BufRead, Write};

use appointment_cell::{
    validate_text, AppointmentBookingService, AppointmentKey, AppointmentStore,
    BookAppointmentRequest, Clock,
};
use auth_cell::{passwords_match, AccountStore};
use shared_models::auth::{Role, Session};
use shared_models::error::AppError;
use tracing::debug;

use crate::console::Console;
use crate::view;

const MAX_PASSWORD_ATTEMPTS: u32 = 3;

/// Whether a menu loop should keep going after handling one choice.
enum Flow {
    Stay,
    Leave,
}

/// The interactive menus over the account store and the appointment book.
pub struct App<S, C> {
    accounts: AccountStore,
    booking: AppointmentBookingService<S, C>,
}

impl<S: AppointmentStore, C: Clock> App<S, C> {
    pub fn new(accounts: AccountStore, booking: AppointmentBookingService<S, C>) -> Self {
        Self { accounts, booking }
    }

    #[cfg(test)]
    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    #[cfg(test)]
    pub fn booking(&self) -> &AppointmentBookingService<S, C> {
        &self.booking
    }

    /// Runs the top-level menu until the user exits or input ends.
    pub fn run<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> io::Result<()> {
        loop {
            console.say("\n===== APPOINTMENT SYSTEM =====")?;
            console.say("1. Sign Up\n2. Sign In\n3. Exit")?;

            let flow = match console.prompt_number("Enter your choice: ")? {
                None | Some(3) => Flow::Leave,
                Some(1) => self.sign_up(console, Role::Patient)?,
                Some(2) => self.sign_in(console)?,
                Some(_) => {
                    console.say("Invalid choice. Please try again.")?;
                    Flow::Stay
                }
            };

            if let Flow::Leave = flow {
                console.say("Thank you for using the Appointment System.")?;
                return Ok(());
            }
        }
    }

    fn sign_up<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
        role: Role,
    ) -> io::Result<Flow> {
        let Some(username) = console.prompt_line("Enter username: ")? else {
            return Ok(Flow::Leave);
        };

        let mut attempts = MAX_PASSWORD_ATTEMPTS;
        let password = loop {
            let Some(password) = console.prompt_line("Enter password: ")? else {
                return Ok(Flow::Leave);
            };
            let Some(confirmation) = console.prompt_line("Confirm password: ")? else {
                return Ok(Flow::Leave);
            };

            if passwords_match(&password, &confirmation).is_ok() {
                break password;
            }
            attempts -= 1;
            console.say(format!(
                "Passwords do not match. You have {} attempts left.",
                attempts
            ))?;
            if attempts == 0 {
                console.say("Failed to create account due to password mismatch.")?;
                return Ok(Flow::Stay);
            }
        };

        match self.accounts.register(&username, &password, role) {
            Ok(_) => console.say("User account created successfully.")?,
            Err(e) => report(console, e.into())?,
        }
        Ok(Flow::Stay)
    }

    fn sign_in<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> io::Result<Flow> {
        let Some(username) = console.prompt_line("Enter username: ")? else {
            return Ok(Flow::Leave);
        };
        let Some(password) = console.prompt_line("Enter password: ")? else {
            return Ok(Flow::Leave);
        };

        let session = match self.accounts.authenticate(&username, &password) {
            Ok(session) => session,
            Err(_) => {
                console.say("Login failed. Incorrect username or password.")?;
                return Ok(Flow::Stay);
            }
        };

        console.say("Login successful!")?;
        if session.is_admin() {
            self.admin_menu(console, &session)
        } else {
            self.patient_menu(console, &session)
        }
    }

    fn admin_menu<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
        session: &Session,
    ) -> io::Result<Flow> {
        debug!("Entering admin menu for {}", session.username);
        loop {
            console.say("\n===== ADMIN MENU =====")?;
            console.say(
                "1. View all appointments\n2. Search appointments by name\n\
                 3. Delete an appointment\n4. Create a new user\n5. Log out",
            )?;

            let Some(choice) = console.prompt_number("Enter your choice: ")? else {
                return Ok(Flow::Leave);
            };

            let flow = match choice {
                1 => self.show_all(console)?,
                2 => self.search(console, "Enter the name to search for: ")?,
                3 => self.delete(console)?,
                4 => self.create_user(console)?,
                5 => {
                    console.say("Logging out from admin account...")?;
                    return Ok(Flow::Stay);
                }
                _ => {
                    console.say("Invalid choice. Please try again.")?;
                    Flow::Stay
                }
            };
            if let Flow::Leave = flow {
                return Ok(Flow::Leave);
            }
        }
    }

    fn patient_menu<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
        session: &Session,
    ) -> io::Result<Flow> {
        debug!("Entering patient menu for {}", session.username);
        loop {
            console.say("\n===== PATIENT MENU =====")?;
            console.say(
                "1. Book an appointment\n2. View my appointments\n3. Cancel an appointment\n\
                 4. Modify an appointment\n5. View available slots\n6. Log out",
            )?;

            let Some(choice) = console.prompt_number("Enter your choice: ")? else {
                return Ok(Flow::Leave);
            };

            let flow = match choice {
                1 => self.book(console)?,
                2 => self.search(console, "Enter the name the appointments were booked under: ")?,
                3 => self.delete(console)?,
                4 => self.modify(console)?,
                5 => self.show_available(console)?,
                6 => {
                    console.say("Logging out...")?;
                    return Ok(Flow::Stay);
                }
                _ => {
                    console.say("Invalid choice. Please try again.")?;
                    Flow::Stay
                }
            };
            if let Flow::Leave = flow {
                return Ok(Flow::Leave);
            }
        }
    }

    fn create_user<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> io::Result<Flow> {
        let Some(admin) = console.confirm("Grant administrator rights?")? else {
            return Ok(Flow::Leave);
        };
        let role = if admin { Role::Admin } else { Role::Patient };
        self.sign_up(console, role)
    }

    fn show_all<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> io::Result<Flow> {
        if self.booking.appointments().is_empty() {
            console.say("No appointments scheduled.")?;
        } else {
            console.say(view::appointment_table(
                "CURRENT APPOINTMENTS",
                self.booking.appointments(),
            ))?;
        }
        Ok(Flow::Stay)
    }

    fn search<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
        label: &str,
    ) -> io::Result<Flow> {
        if self.booking.appointments().is_empty() {
            console.say("No appointments to search.")?;
            return Ok(Flow::Stay);
        }
        let Some(name) = console.prompt_line(label)? else {
            return Ok(Flow::Leave);
        };

        let found = self.booking.search_by_name(&name);
        if found.is_empty() {
            console.say(format!("No appointments found for '{}'.", name))?;
        } else {
            console.say("\n===== SEARCH RESULTS =====")?;
            for appointment in found {
                console.say(format!("{}\n", view::appointment_details(appointment)))?;
            }
        }
        Ok(Flow::Stay)
    }

    fn delete<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> io::Result<Flow> {
        if self.booking.appointments().is_empty() {
            console.say("No appointments to delete.")?;
            return Ok(Flow::Stay);
        }
        self.show_all(console)?;

        let Some(key) = prompt_key(console, "delete")? else {
            return Ok(Flow::Leave);
        };
        let Some(confirmed) = console.confirm("Are you sure you want to delete this appointment?")?
        else {
            return Ok(Flow::Leave);
        };
        if !confirmed {
            console.say("Deletion cancelled.")?;
            return Ok(Flow::Stay);
        }

        match self.booking.cancel(&key) {
            Ok(_) => console.say("Appointment successfully deleted.")?,
            Err(e) => report(console, e.into())?,
        }
        Ok(Flow::Stay)
    }

    fn book<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> io::Result<Flow> {
        let Some(patient_name) = console.prompt_line("Enter your name: ")? else {
            return Ok(Flow::Leave);
        };
        if let Err(e) = validate_text("Name", &patient_name) {
            report(console, e.into())?;
            return Ok(Flow::Stay);
        }
        let Some(illness_note) = console.prompt_line("Enter what you are suffering from: ")? else {
            return Ok(Flow::Leave);
        };
        if let Err(e) = validate_text("Illness", &illness_note) {
            report(console, e.into())?;
            return Ok(Flow::Stay);
        }
        let Some(date) = console.prompt_date("Enter date (DD MM YYYY): ")? else {
            return Ok(Flow::Leave);
        };

        let slots = match self.booking.available_slots(&date) {
            Ok(slots) => slots,
            Err(e) => {
                report(console, e.into())?;
                return Ok(Flow::Stay);
            }
        };
        console.say(view::slot_list(&date, &slots))?;
        if slots.is_empty() {
            return Ok(Flow::Stay);
        }

        let grid = *self.booking.grid();
        let slot = loop {
            let Some(slot) = console.prompt_time(&format!(
                "Enter preferred time (HH MM, {:02}:00-{:02}:00): ",
                grid.open_hour(),
                grid.close_hour()
            ))?
            else {
                return Ok(Flow::Leave);
            };

            if !grid.contains(&slot) {
                console.say(format!(
                    "Invalid time slot. Please choose a time between {:02}:00 and {:02}:00 ({}-minute intervals).",
                    grid.open_hour(),
                    grid.close_hour(),
                    grid.slot_minutes()
                ))?;
            } else if !self.booking.is_slot_available(&date, &slot) {
                console.say("The selected slot is already booked. Please choose another time.")?;
            } else {
                break slot;
            }
        };

        let request = BookAppointmentRequest {
            patient_name,
            illness_note,
            date,
            slot,
        };
        match self.booking.book(request) {
            Ok(appointment) => console.say(format!(
                "Your appointment has been successfully booked for {} at {}",
                appointment.date, appointment.slot
            ))?,
            Err(e) => report(console, e.into())?,
        }
        Ok(Flow::Stay)
    }

    fn modify<R: BufRead, W: Write>(&mut self, console: &mut Console<R, W>) -> io::Result<Flow> {
        if self.booking.appointments().is_empty() {
            console.say("No appointments to modify.")?;
            return Ok(Flow::Stay);
        }
        self.show_all(console)?;

        let Some(key) = prompt_key(console, "modify")? else {
            return Ok(Flow::Leave);
        };
        let Some(current) = self.booking.ledger().get(&key) else {
            console.say("Appointment not found.")?;
            return Ok(Flow::Stay);
        };

        console.say(format!(
            "\nCurrent appointment details:\n{}",
            view::appointment_details(current)
        ))?;
        console.say("\nWhat would you like to modify?\n1. Date and time\n2. Illness details\n3. Cancel modification")?;

        let Some(choice) = console.prompt_number("Enter your choice: ")? else {
            return Ok(Flow::Leave);
        };

        let outcome = match choice {
            1 => {
                let Some(date) = console.prompt_date("Enter new date (DD MM YYYY): ")? else {
                    return Ok(Flow::Leave);
                };
                let Some(slot) = console.prompt_time("Enter new time (HH MM): ")? else {
                    return Ok(Flow::Leave);
                };
                self.booking
                    .reschedule(&key, date, slot)
                    .map(|_| "Appointment rescheduled successfully.")
            }
            2 => {
                let Some(note) = console.prompt_line("Enter new illness details: ")? else {
                    return Ok(Flow::Leave);
                };
                self.booking
                    .update_illness(&key, note)
                    .map(|_| "Illness details updated successfully.")
            }
            3 => Ok("Modification cancelled."),
            _ => Ok("Invalid choice."),
        };

        match outcome {
            Ok(message) => console.say(message)?,
            Err(e) => report(console, e.into())?,
        }
        Ok(Flow::Stay)
    }

    fn show_available<R: BufRead, W: Write>(
        &mut self,
        console: &mut Console<R, W>,
    ) -> io::Result<Flow> {
        let Some(date) = console.prompt_date("Enter date (DD MM YYYY): ")? else {
            return Ok(Flow::Leave);
        };

        match self.booking.available_slots(&date) {
            Ok(slots) => console.say(view::slot_list(&date, &slots))?,
            Err(e) => report(console, e.into())?,
        }
        Ok(Flow::Stay)
    }
}

fn prompt_key<R: BufRead, W: Write>(
    console: &mut Console<R, W>,
    action: &str,
) -> io::Result<Option<AppointmentKey>> {
    let Some(date) = console.prompt_date(&format!(
        "Enter the date (DD MM YYYY) of the appointment to {}: ",
        action
    ))?
    else {
        return Ok(None);
    };
    let Some(slot) = console.prompt_time(&format!(
        "Enter the time (HH MM) of the appointment to {}: ",
        action
    ))?
    else {
        return Ok(None);
    };
    Ok(Some(AppointmentKey::new(date, slot)))
}

fn report<R: BufRead, W: Write>(console: &mut Console<R, W>, err: AppError) -> io::Result<()> {
    err.log();
    if err.is_recoverable() {
        console.say(err.message())
    } else {
        console.say(format!("{} Your last change was not saved.", err.message()))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use appointment_cell::{
        AppointmentStore, Date, FileAppointmentStore, FixedClock, SlotGrid, TimeSlot,
    };
    use shared_utils::DisplayObfuscation;
    use tempfile::TempDir;

    use super::*;

    // ==============================================================================
    // TEST SETUP
    // ==============================================================================

    struct TestSetup {
        dir: TempDir,
    }

    impl TestSetup {
        fn new() -> Self {
            Self {
                dir: TempDir::new().unwrap(),
            }
        }

        fn store(&self) -> FileAppointmentStore {
            FileAppointmentStore::new(
                self.dir.path().join("appointments.dat"),
                DisplayObfuscation::default(),
            )
        }

        fn app(&self) -> App<FileAppointmentStore, FixedClock> {
            let mut accounts = AccountStore::load(self.dir.path().join("users.dat")).unwrap();
            accounts.ensure_admin("admin", "admin123").unwrap();
            let booking = AppointmentBookingService::load(
                self.store(),
                FixedClock(Date::new(19, 10, 2026)),
                SlotGrid::default(),
            )
            .unwrap();
            App::new(accounts, booking)
        }
    }

    fn run_script(app: &mut App<FileAppointmentStore, FixedClock>, script: &str) -> String {
        let mut console = Console::new(Cursor::new(script.as_bytes().to_vec()), Vec::new());
        app.run(&mut console).unwrap();
        String::from_utf8(console.into_output()).unwrap()
    }

    const PATIENT_SIGN_UP: &str = "1\nalice\npw\npw\n";
    const PATIENT_SIGN_IN: &str = "2\nalice\npw\n";

    // ==============================================================================
    // ACCOUNT FLOWS
    // ==============================================================================

    #[test]
    fn test_sign_up_then_sign_in() {
        let setup = TestSetup::new();
        let mut app = setup.app();

        let script = format!("{}{}6\n3\n", PATIENT_SIGN_UP, PATIENT_SIGN_IN);
        let output = run_script(&mut app, &script);

        assert!(output.contains("User account created successfully."));
        assert!(output.contains("Login successful!"));
        assert!(output.contains("PATIENT MENU"));
        assert!(output.contains("Thank you for using the Appointment System."));
        assert!(app.accounts().find("alice").is_some());
    }

    #[test]
    fn test_sign_up_gives_up_after_three_mismatches() {
        let setup = TestSetup::new();
        let mut app = setup.app();

        let output = run_script(&mut app, "1\nbob\na\nb\na\nc\na\nd\n3\n");

        assert!(output.contains("You have 2 attempts left."));
        assert!(output.contains("Failed to create account due to password mismatch."));
        assert!(app.accounts().find("bob").is_none());
    }

    #[test]
    fn test_duplicate_username_is_rejected() {
        let setup = TestSetup::new();
        let mut app = setup.app();

        let output = run_script(&mut app, "1\nadmin\nx\nx\n3\n");

        assert!(output.contains("Username admin already exists."));
        assert_eq!(app.accounts().len(), 1);
    }

    #[test]
    fn test_wrong_password_does_not_sign_in() {
        let setup = TestSetup::new();
        let mut app = setup.app();

        let output = run_script(&mut app, "2\nadmin\nnope\n3\n");

        assert!(output.contains("Login failed. Incorrect username or password."));
        assert!(!output.contains("ADMIN MENU"));
    }

    #[test]
    fn test_admin_creates_admin_account() {
        let setup = TestSetup::new();
        let mut app = setup.app();

        let output = run_script(&mut app, "2\nadmin\nadmin123\n4\n1\ncarol\nsecret\nsecret\n5\n3\n");

        assert!(output.contains("ADMIN MENU"));
        assert!(output.contains("User account created successfully."));
        assert!(app.accounts().find("carol").is_some_and(|u| u.role.is_admin()));
    }

    #[test]
    fn test_end_of_input_exits_cleanly() {
        let setup = TestSetup::new();
        let mut app = setup.app();

        let output = run_script(&mut app, "2\nadmin\nadmin123\n");

        assert!(output.contains("ADMIN MENU"));
        assert!(output.contains("Thank you for using the Appointment System."));
    }

    #[test]
    fn test_non_numeric_choice_reprompts() {
        let setup = TestSetup::new();
        let mut app = setup.app();

        let output = run_script(&mut app, "abc\n9\n3\n");

        assert!(output.contains("Invalid input. Please enter a number."));
        assert!(output.contains("Invalid choice. Please try again."));
    }

    // ==============================================================================
    // APPOINTMENT FLOWS
    // ==============================================================================

    #[test]
    fn test_patient_books_and_it_is_persisted() {
        let setup = TestSetup::new();
        let mut app = setup.app();

        let script = format!(
            "{}{}1\nAlice\nFlu\n02 11 2026\n10 00\n6\n3\n",
            PATIENT_SIGN_UP, PATIENT_SIGN_IN
        );
        let output = run_script(&mut app, &script);

        assert!(output.contains("AVAILABLE SLOTS FOR Mon 02/11/2026"));
        assert!(output.contains("successfully booked for 02/11/2026 at 10:00"));
        assert_eq!(app.booking().appointments().len(), 1);

        let stored = setup.store().load_all().unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].patient_name, "Alice");
        assert_eq!(stored[0].slot, TimeSlot::new(10, 0));
    }

    #[test]
    fn test_booking_reprompts_for_taken_and_off_grid_slots() {
        let setup = TestSetup::new();
        let mut app = setup.app();

        let script = format!(
            "{}{}1\nAlice\nFlu\n02 11 2026\n10 00\n\
             1\nBen\nCough\n02 11 2026\n10 00\n10 15\n10 30\n6\n3\n",
            PATIENT_SIGN_UP, PATIENT_SIGN_IN
        );
        let output = run_script(&mut app, &script);

        assert!(output.contains("The selected slot is already booked."));
        assert!(output.contains("Invalid time slot."));
        assert!(output.contains("successfully booked for 02/11/2026 at 10:30"));
        assert_eq!(app.booking().appointments().len(), 2);
    }

    #[test]
    fn test_overlong_name_is_refused_before_asking_for_a_date() {
        let setup = TestSetup::new();
        let mut app = setup.app();

        let script = format!(
            "{}{}1\n{}\n6\n3\n",
            PATIENT_SIGN_UP,
            PATIENT_SIGN_IN,
            "x".repeat(50)
        );
        let output = run_script(&mut app, &script);

        assert!(output.contains("Name must be at most 49 bytes"));
        assert!(!output.contains("Enter what you are suffering from"));
        assert!(!output.contains("Enter date"));
        assert!(app.booking().appointments().is_empty());
    }

    #[test]
    fn test_booking_in_the_past_is_refused() {
        let setup = TestSetup::new();
        let mut app = setup.app();

        let script = format!(
            "{}{}1\nAlice\nFlu\n18 10 2026\n6\n3\n",
            PATIENT_SIGN_UP, PATIENT_SIGN_IN
        );
        let output = run_script(&mut app, &script);

        assert!(output.contains("Cannot book appointments for past dates"));
        assert!(app.booking().appointments().is_empty());
    }

    #[test]
    fn test_admin_deletes_after_confirmation() {
        let setup = TestSetup::new();
        let mut app = setup.app();

        let script = format!(
            "{}{}1\nAlice\nFlu\n02 11 2026\n10 00\n6\n\
             2\nadmin\nadmin123\n3\n02 11 2026\n10 00\n0\n3\n02 11 2026\n10 00\n1\n5\n3\n",
            PATIENT_SIGN_UP, PATIENT_SIGN_IN
        );
        let output = run_script(&mut app, &script);

        assert!(output.contains("Deletion cancelled."));
        assert!(output.contains("Appointment successfully deleted."));
        assert!(app.booking().appointments().is_empty());
        assert!(setup.store().load_all().unwrap().is_empty());
    }

    #[test]
    fn test_modify_reschedules_and_frees_old_slot() {
        let setup = TestSetup::new();
        let mut app = setup.app();

        let script = format!(
            "{}{}1\nAlice\nFlu\n02 11 2026\n10 00\n4\n02 11 2026\n10 00\n1\n03 11 2026\n14 30\n6\n3\n",
            PATIENT_SIGN_UP, PATIENT_SIGN_IN
        );
        let output = run_script(&mut app, &script);

        assert!(output.contains("Appointment rescheduled successfully."));
        let booking = app.booking();
        assert!(booking.is_slot_available(&Date::new(2, 11, 2026), &TimeSlot::new(10, 0)));
        assert!(!booking.is_slot_available(&Date::new(3, 11, 2026), &TimeSlot::new(14, 30)));
    }

    #[test]
    fn test_search_by_name_lists_matches() {
        let setup = TestSetup::new();
        let mut app = setup.app();

        let script = format!(
            "{}{}1\nAlice\nFlu\n02 11 2026\n10 00\n2\nAlice\n2\nNobody\n6\n3\n",
            PATIENT_SIGN_UP, PATIENT_SIGN_IN
        );
        let output = run_script(&mut app, &script);

        assert!(output.contains("SEARCH RESULTS"));
        assert!(output.contains("Illness: Flu"));
        assert!(output.contains("No appointments found for 'Nobody'."));
    }
}
