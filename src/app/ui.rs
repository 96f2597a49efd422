mod debug;
mod editor;
mod topbar;
