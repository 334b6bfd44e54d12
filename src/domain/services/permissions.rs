use crate::domain::models::access::{AccessLevel, ProjectAccess};

/// The closed set of checkable capabilities. A capability that does not
/// exist cannot be requested, so the check fails closed by construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Capability {
    Read,
    Write,
    Admin,
    CreateTickets,
    EditTickets,
    AssignTickets,
    DeleteTickets,
    ApproveWorkflow,
    ViewAllTickets,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::Read => "read",
            Capability::Write => "write",
            Capability::Admin => "admin",
            Capability::CreateTickets => "createTickets",
            Capability::EditTickets => "editTickets",
            Capability::AssignTickets => "assignTickets",
            Capability::DeleteTickets => "deleteTickets",
            Capability::ApproveWorkflow => "approveWorkflow",
            Capability::ViewAllTickets => "viewAllTickets",
        }
    }
}

/// Pure allow/deny decision for a loaded grant. No I/O: the caller supplies
/// the grant (or its absence) and gets the same answer for the same input.
///
/// ADMIN access level short-circuits every capability; the boolean flags are
/// advisory once it is set. `read` holds for any existing grant.
pub fn evaluate(access: Option<&ProjectAccess>, capability: Capability) -> bool {
    let Some(access) = access else {
        return false;
    };

    if access.access_level == AccessLevel::Admin {
        return true;
    }

    match capability {
        Capability::Read => true,
        Capability::Write => access.access_level == AccessLevel::Write,
        Capability::Admin => false,
        Capability::CreateTickets => access.can_create_tickets,
        Capability::EditTickets => access.can_edit_tickets,
        Capability::AssignTickets => access.can_assign_tickets,
        Capability::DeleteTickets => access.can_delete_tickets,
        Capability::ApproveWorkflow => access.can_approve_workflow,
        Capability::ViewAllTickets => access.can_view_all_tickets,
    }
}
